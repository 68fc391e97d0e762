use axum::Router;
use tokio::net::TcpListener;

pub const TEST_KEY: &str = "test-key";
pub const TEST_SECRET: &str = "test-secret";

pub async fn spawn_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}
