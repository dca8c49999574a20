//! Async operations for the TUI
//!
//! Uses channels to communicate between the sync TUI loop and async tasks.
//! Each command runs on its own task, so a slow request never blocks the next
//! one; feed results carry their sequence number so stale ones can be dropped.

use tokio::sync::mpsc;

use crate::actions::{self, LoginSuccess, Mutation};
use crate::api::ApiClient;
use crate::feed::FeedRequest;
use crate::models::Post;

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone)]
pub enum AsyncCommand {
    /// Load a feed
    FetchFeed {
        /// Sequence number and scope of the fetch
        request: FeedRequest,
        /// Stored bearer token, if any
        token: Option<String>,
    },
    /// Log in
    Login {
        /// Username or email
        username: String,
        /// Password as typed
        password: String,
    },
    /// Create an account
    Register {
        /// Desired username
        username: String,
        /// Email address
        email: String,
        /// Password as typed
        password: String,
    },
    /// Change the logged-in user's password
    ChangePassword {
        /// Stored bearer token, if any
        token: Option<String>,
        /// Logged-in username
        username: String,
        /// Current password
        current_password: String,
        /// Replacement password
        new_password: String,
    },
    /// Create, edit or delete a post
    Mutate {
        /// Stored bearer token, if any
        token: Option<String>,
        /// Validated request to send
        mutation: Mutation,
    },
    /// Shutdown the worker
    Shutdown,
}

/// Results sent back from the async worker to the TUI
#[derive(Debug)]
pub enum AsyncResult {
    /// Feed fetch `seq` finished
    FeedFetched {
        /// Sequence number of the fetch
        seq: u64,
        /// Posts, or the message to show
        result: Result<Vec<Post>, String>,
    },
    /// Login accepted
    LoggedIn(LoginSuccess),
    /// Login rejected
    LoginFailed {
        /// Message to show
        message: String,
    },
    /// Account created
    Registered {
        /// Username to prefill in the login form
        username: String,
        /// Server confirmation
        message: String,
    },
    /// Sign-up rejected
    RegisterFailed {
        /// Message to show
        message: String,
    },
    /// Password changed
    PasswordChanged {
        /// Confirmation to show
        message: String,
    },
    /// Password change rejected
    PasswordChangeFailed {
        /// Message to show
        message: String,
    },
    /// Mutation succeeded
    Mutated {
        /// The request that succeeded
        mutation: Mutation,
    },
    /// Mutation failed
    MutationFailed {
        /// The request that failed
        mutation: Mutation,
        /// Message to show
        message: String,
    },
}

/// Channel handles for communicating with the async worker
pub struct AsyncHandle {
    /// Send commands to the worker
    pub cmd_tx: mpsc::Sender<AsyncCommand>,
    /// Receive results from the worker
    pub result_rx: mpsc::Receiver<AsyncResult>,
}

/// Spawn the async worker and return handles
pub fn spawn_worker(api: ApiClient, page_size: u32) -> AsyncHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<AsyncCommand>(32);
    let (result_tx, result_rx) = mpsc::channel::<AsyncResult>(32);

    tokio::spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            if matches!(cmd, AsyncCommand::Shutdown) {
                break;
            }
            let api = api.clone();
            let result_tx = result_tx.clone();
            tokio::spawn(async move {
                let result = execute(&api, cmd, page_size).await;
                if let Some(result) = result {
                    let _ = result_tx.send(result).await;
                }
            });
        }
    });

    AsyncHandle { cmd_tx, result_rx }
}

/// Run one command to completion
pub async fn execute(api: &ApiClient, cmd: AsyncCommand, page_size: u32) -> Option<AsyncResult> {
    let result = match cmd {
        AsyncCommand::FetchFeed { request, token } => AsyncResult::FeedFetched {
            seq: request.seq,
            result: actions::fetch_feed(api, request, token.as_deref(), page_size).await,
        },
        AsyncCommand::Login { username, password } => {
            match actions::login(api, &username, &password).await {
                Ok(success) => AsyncResult::LoggedIn(success),
                Err(message) => AsyncResult::LoginFailed { message },
            }
        }
        AsyncCommand::Register {
            username,
            email,
            password,
        } => match actions::register(api, &username, &email, &password).await {
            Ok(message) => AsyncResult::Registered { username, message },
            Err(message) => AsyncResult::RegisterFailed { message },
        },
        AsyncCommand::ChangePassword {
            token,
            username,
            current_password,
            new_password,
        } => match actions::change_password(
            api,
            token.as_deref(),
            &username,
            &current_password,
            &new_password,
        )
        .await
        {
            Ok(message) => AsyncResult::PasswordChanged { message },
            Err(message) => AsyncResult::PasswordChangeFailed { message },
        },
        AsyncCommand::Mutate { token, mutation } => {
            match actions::run_mutation(api, token.as_deref(), &mutation).await {
                Ok(()) => AsyncResult::Mutated { mutation },
                Err(message) => AsyncResult::MutationFailed { mutation, message },
            }
        }
        AsyncCommand::Shutdown => return None,
    };
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{FEED_TRANSPORT_ERROR, FeedScope};

    fn unreachable_api() -> ApiClient {
        ApiClient::new("http://127.0.0.1:1/api")
    }

    #[test]
    fn test_shutdown_produces_no_result() {
        let result = tokio_test::block_on(execute(&unreachable_api(), AsyncCommand::Shutdown, 20));
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_feed_failure_keeps_sequence_number() {
        let cmd = AsyncCommand::FetchFeed {
            request: FeedRequest {
                seq: 7,
                scope: FeedScope::Public,
            },
            token: None,
        };
        let Some(AsyncResult::FeedFetched { seq, result }) =
            execute(&unreachable_api(), cmd, 20).await
        else {
            panic!("expected feed result");
        };
        assert_eq!(seq, 7);
        assert_eq!(result, Err(FEED_TRANSPORT_ERROR.to_string()));
    }

    #[tokio::test]
    async fn test_mutation_failure_carries_mutation() {
        let cmd = AsyncCommand::Mutate {
            token: Some("jwt".to_string()),
            mutation: Mutation::Delete { id: 3 },
        };
        let Some(AsyncResult::MutationFailed { mutation, message }) =
            execute(&unreachable_api(), cmd, 20).await
        else {
            panic!("expected mutation failure");
        };
        assert_eq!(mutation, Mutation::Delete { id: 3 });
        assert_eq!(message, "Error deleting post");
    }
}
