//! `ChannelWriter` — the one capability a pump needs to write to an SSH
//! channel, signal EOF, and set the exit status. Deliberately narrow: no
//! reflection over channel types, unlike the reference implementation's
//! `isinstance` check in `_write_to_channel`.

use russh::server::Handle;
use russh::{ChannelId, CryptoVec};

use crate::error::{PumpError, Result};

#[derive(Clone)]
pub struct ChannelWriter {
    handle: Handle,
    channel_id: ChannelId,
}

impl ChannelWriter {
    pub fn new(handle: Handle, channel_id: ChannelId) -> Self {
        Self { handle, channel_id }
    }

    pub async fn data(&self, bytes: &[u8]) -> Result<()> {
        self.handle
            .data(self.channel_id, CryptoVec::from_slice(bytes))
            .await
            .map_err(|_| PumpError::ChannelWrite)
    }

    pub async fn eof(&self) {
        let _ = self.handle.eof(self.channel_id).await;
    }

    pub async fn exit_status(&self, code: u32) {
        let _ = self.handle.exit_status_request(self.channel_id, code).await;
    }

    pub async fn close(&self) {
        let _ = self.handle.close(self.channel_id).await;
    }
}
