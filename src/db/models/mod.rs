//! Database row types and wire DTOs

pub mod order;
pub mod pricing;
pub mod setting;

pub use order::{FileRef, NewOrder, NewOrderItem, Order, OrderItem, OrderStatus};
pub use pricing::{PaperType, PrintOption, PrintSize, PrintSizeWithDiscounts, ProductCatalog, VolumeDiscount};
pub use setting::{Setting, SettingUpsert};
