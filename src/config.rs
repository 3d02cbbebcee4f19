use std::env::var;

use dotenvy::dotenv;

pub struct Config {
    pub port: u16,
    pub scheme: String,
    pub host: String,
    pub mailer_dsn: String,
    pub webhook_secret: String,
}

impl Config {
    pub fn try_parse() -> Result<Config, &'static str> {
        let _ = dotenv();

        Ok(Config {
            port: var("PORT")
                .map_err(|_| "An error occured while getting PORT env param")?
                .parse::<u16>()
                .map_err(|_| "An error occured while parsing PORT env param")?,
            scheme: var("SCHEME").map_err(|_| "An error occured while getting SCHEME env param")?,
            host: var("HOST").map_err(|_| "An error occured while getting HOST env param")?,
            mailer_dsn: var("MAILER_DSN")
                .map_err(|_| "An error occured while getting MAILER_DSN env param")?,
            webhook_secret: var("DASHAMAIL_WEBHOOK_SECRET")
                .map_err(|_| "An error occured while getting DASHAMAIL_WEBHOOK_SECRET env param")?,
        })
    }

    pub fn server_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}
