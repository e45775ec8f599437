//! SMS dispatch with bounded retry

mod dispatcher;
mod traits;


pub use dispatcher::{DispatchError, DispatchReceipt, RetryingDispatcher};
pub use traits::{SmsError, SmsSender};
