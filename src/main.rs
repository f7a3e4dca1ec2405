#[tokio::main]
async fn main() {
    event_booking_backend::run().await;
}
