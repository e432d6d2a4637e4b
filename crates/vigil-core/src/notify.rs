//! The `Notifier` trait — anything that can deliver a text to a contact.

use std::future::Future;

/// Delivers a text message to a contact identifier.
///
/// Delivery is best-effort. Callers log failures rather than retrying.
pub trait Notifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn send<'a>(
    &'a self,
    contact_id: &'a str,
    text: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
