pub mod agenda_service;
pub use agenda_service::AgendaService;
pub mod availability_service;
pub use availability_service::AvailabilityService;
pub mod catalog_service;
pub use catalog_service::{Catalog, InMemoryCatalog};
pub mod finance_service;
pub use finance_service::FinanceService;
pub mod notification_service;
pub use notification_service::{LogNotificationSink, NotificationSink};
