//! Session: the server's record of one connected user.
//!
//! The connection layer creates a session when a user authenticates and
//! drains the receiving half of its outbound channel onto the socket.
//! Everything the core wants a user to see goes through [`Session::send`].

use cardroom_protocol::{Outbound, Severity, TableEvent, TableId, UserId};
use tokio::sync::mpsc;

/// Channel sender for delivering outbound messages to a session.
pub type SessionSender = mpsc::UnboundedSender<Outbound>;

/// A connected user, as seen by tables and command handlers.
///
/// Cheap to clone: every table the user sits at holds its own copy, all
/// feeding the same outbound channel.
#[derive(Debug, Clone)]
pub struct Session {
    /// Which user this session belongs to.
    pub user_id: UserId,

    /// Display name, as typed at registration.
    pub username: String,

    outbound: SessionSender,
}

impl Session {
    pub fn new(user_id: UserId, username: impl Into<String>, outbound: SessionSender) -> Self {
        Self {
            user_id,
            username: username.into(),
            outbound,
        }
    }

    /// Creates a session together with the receiver the connection layer
    /// should drain.
    pub fn channel(
        user_id: UserId,
        username: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(user_id, username, tx), rx)
    }

    /// Queues a message for this user. Silently drops it if the
    /// connection is gone.
    pub fn send(&self, msg: Outbound) {
        let _ = self.outbound.send(msg);
    }

    /// Tells this user that a table changed.
    pub fn notify(&self, table_id: TableId, event: TableEvent) {
        self.send(Outbound::Table { table_id, event });
    }

    /// Sends a private warning (request rejected, nothing changed).
    pub fn warn(&self, text: impl Into<String>) {
        self.notice(Severity::Warning, text);
    }

    /// Sends a private error.
    pub fn error(&self, text: impl Into<String>) {
        self.notice(Severity::Error, text);
    }

    pub fn notice(&self, severity: Severity, text: impl Into<String>) {
        self.send(Outbound::Notice {
            severity,
            text: text.into(),
        });
    }

    /// Returns `true` while the connection layer still holds the receiver.
    pub fn is_connected(&self) -> bool {
        !self.outbound.is_closed()
    }
}
