/// DashaMail API error codes, sorted by code.
static ERROR_CODES: &[(i64, &str)] = &[
    (2, "ошибка при добавлении в базу"),
    (3, "заданы не все необходимые параметры"),
    (4, "нет данных при выводе"),
    (5, "у пользователя нет адресной базы с таким id"),
    (6, "некорректный email-адрес"),
    (7, "такой пользователь уже есть в этой адресной базе"),
    (8, "лимит по количеству активных подписчиков на тарифном плане клиента"),
    (9, "нет такого подписчика у клиента"),
    (10, "пользователь уже отписан"),
    (11, "нет данных для обновления подписчика"),
    (12, "не заданы элементы списка"),
    (13, "не задано время рассылки"),
    (14, "Не задан заголовок письма"),
    (15, "Не задано поле От Кого?"),
    (16, "Не задан обратный адрес"),
    (17, "Не задана ни html ни plain_text версия письма"),
    (
        18,
        "Нет ссылки отписаться [ссылки с id=\"unsub_link\"] в тексте рассылки. Пример ссылки: отписаться",
    ),
    (19, "Нет ссылки отписаться [%ОТПИСАТЬСЯ%] в тексте рассылки."),
    (20, "задан недопустимый статус рассылки"),
    (21, "рассылка уже отправляется"),
    (22, "у вас нет кампании с таким campaign_id"),
    (23, "нет такого поля для сортировки"),
    (24, "заданы недопустимые события для авторассылки"),
    (25, "загружаемый файл уже существует"),
    (26, "загружаемый файл больше 5 Мб"),
    (27, "файл не найден"),
    (28, "указанный шаблон не существует"),
    (29, "определен одноразовый email-адрес"),
    (30, "отправка рассылок заблокирована по подозрению в спаме"),
    (31, "массив email-адресов пуст"),
    (32, "нет корректных адресов для добавления"),
    (33, "недопустимый формат файла"),
    (34, "необходимо настроить собственный домен отправки"),
    (
        35,
        "данный функционал недоступен на бесплатных тарифах и во время триального периода",
    ),
    (36, "ошибка при отправке письма"),
    (37, "рассылка еще не прошла модерацию"),
    (38, "недопустимый сегмент"),
    (39, "нет папки с таким id"),
    (40, "рассылка не находится в статусе PROCESSING или SENT"),
    (41, "рассылка не отправляется в данный момент"),
    (42, "у вас нет рассылки на паузе с таким campaign_id"),
    (43, "Пользователь в черном списке (двойная отписка)"),
    (44, "Пользователь в черном списке (нажатие «это спам»)"),
    (45, "Пользователь в черном списке (ручное)"),
    (
        46,
        "Несуществующий email-адрес (находится в глобальном списке возвратов)",
    ),
    (47, "Ваш ip-адрес не включен в список разрешенных"),
    (
        48,
        "Не удалось отправить письмо подтверждения для обратного адреса.",
    ),
    (49, "Такой адрес уже подтвержден"),
    (50, "Нельзя использовать одноразовые email в обратном адресе!"),
    (
        51,
        "Использование обратного адреса на публичных доменах Mail.ru СТРОГО ЗАПРЕЩЕНО политикой DMARC данного почтового провайдера.",
    ),
    (52, "Email-адрес не подтвержден в качестве отправителя"),
    (53, "Недопустимое событие для webhook"),
    (
        54,
        "Некорректный домен. Кириллические и другие национальные домены в качестве DKIM/SPF запрещены.",
    ),
    (
        55,
        "Данный домен находится в черном списке, его добавление запрещено.",
    ),
    (56, "Данный домен занят другим аккаунтом"),
];

pub fn describe(code: i64) -> Option<&'static str> {
    ERROR_CODES
        .binary_search_by_key(&code, |(known, _)| *known)
        .ok()
        .map(|index| ERROR_CODES[index].1)
}
