use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

/// The external side of the widget: whoever checks codes and sends new ones.
///
/// Errors are shown to the user via their `Display` text; an empty message
/// falls back to a generic one.
#[async_trait]
pub trait CodeAuthority: Send + Sync {
    async fn verify(&self, code: &str) -> Result<()>;
    async fn resend(&self) -> Result<()>;
}

#[async_trait]
impl<T: CodeAuthority + ?Sized> CodeAuthority for Arc<T> {
    async fn verify(&self, code: &str) -> Result<()> {
        (**self).verify(code).await
    }

    async fn resend(&self) -> Result<()> {
        (**self).resend().await
    }
}
