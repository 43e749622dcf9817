//! Channel strategy for platforms without a channel model.

use crate::backends::{BoxFuture, ChannelApi};
use crate::components::channel::Channel;
use crate::error::NotifyResult;

/// Verified no-op: accepts every registration, performs nothing, never
/// errors. Selected once at suite construction so call sites stay free of
/// platform branches.
pub struct NoopChannelApi;

impl ChannelApi for NoopChannelApi {
    fn supports_channels(&self) -> bool {
        false
    }

    fn register_channel<'a>(&'a self, channel: &'a Channel) -> BoxFuture<'a, NotifyResult<()>> {
        Box::pin(async move {
            tracing::debug!(channel = %channel.id, "channel model unsupported; registration skipped");
            Ok(())
        })
    }
}
