mod merchant_management;
mod order_management;
mod payment_management;

pub use merchant_management::MerchantManagement;
pub use order_management::OrderManagement;
pub use payment_management::PaymentManagement;
