#[tokio::main]
async fn main() {
    devlink::start_server().await;
}
