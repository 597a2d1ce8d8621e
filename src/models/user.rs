use sqlx::FromRow;

/// Privacy value given to a device the first time it submits spots.
pub const DEFAULT_PRIVACY: i32 = 0;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub user_id: String,
    pub privacy: i32, // 0 = shared, anything else = private
}

impl User {
    pub fn is_shared(&self) -> bool {
        self.privacy == 0
    }
}
