//! Provider adapters.
//!
//! Payment and email providers sit behind small async traits so the
//! scheduler never talks HTTP directly and tests can swap in mocks.

pub mod email;
pub mod mock;
pub mod payment;
pub mod sendgrid;
pub mod stripe;

pub use email::{EmailError, EmailMessage, EmailSender};
pub use mock::{MockMailer, MockPaymentProvider};
pub use payment::{ChargeOutcome, ChargeRequest, PaymentProvider, ProviderError};
pub use sendgrid::SendGridMailer;
pub use stripe::StripeGateway;
