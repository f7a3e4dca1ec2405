/// Already-authenticated caller identity, supplied by the external
/// identity layer. The core never sees credentials.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: String,
    pub is_staff: bool,
}
