pub mod repository;

use contracts::shared::logger::SOURCE_SERVER;

/// Записать серверное событие в system_log (не блокирует вызывающего)
///
/// # Примеры
/// ```ignore
/// logger::log("startup", "Сервер запущен");
/// logger::log("u501_import_catalog", "Импорт завершен: 3 товара");
/// ```
pub fn log(category: &str, message: &str) {
    repository::log_event_detached(SOURCE_SERVER, category, message);
}
