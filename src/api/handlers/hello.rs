use crate::api::error::Message;
use axum::Json;

#[utoipa::path(
    get,
    path = "/hello",
    responses(
        (status = 200, description = "Greeting", body = Message),
    ),
    tag = "misc"
)]
pub async fn hello() -> Json<Message> {
    Json(Message::new("Hello, World!"))
}
