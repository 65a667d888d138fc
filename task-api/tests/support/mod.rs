use std::sync::Arc;
use task_api::{ConnectionProvider, TaskServer, TaskStore};
use tokio::{net::TcpListener, sync::oneshot};

/// Server running on an ephemeral port; stops when dropped
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    _shutdown: oneshot::Sender<()>,
}

impl TestServer {
    pub async fn start<P, S>(connections: Arc<P>, store: Arc<S>) -> Self
    where
        P: ConnectionProvider + 'static,
        S: TaskStore<Handle = P::Handle> + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown, stopped) = oneshot::channel::<()>();

        let server = TaskServer::new(connections, store);
        tokio::spawn(async move {
            server
                .serve_with_listener(listener, async {
                    let _ = stopped.await;
                })
                .await
                .unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
            _shutdown: shutdown,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}
