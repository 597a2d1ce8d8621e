pub const CREATE_SPOTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS spots (
    spot_id BIGSERIAL PRIMARY KEY,
    latd DOUBLE PRECISION NOT NULL,
    longd DOUBLE PRECISION NOT NULL,
    accuracy DOUBLE PRECISION NOT NULL,
    altitude DOUBLE PRECISION NOT NULL,
    speed DOUBLE PRECISION NOT NULL,
    timestamp BIGINT NOT NULL,
    user_id TEXT NOT NULL CHECK (user_id <> '')
);
"#;

pub const CREATE_SPOTS_USER_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS spots_user_id_timestamp_idx ON spots (user_id, timestamp DESC);
"#;

pub const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id TEXT PRIMARY KEY,
    privacy INTEGER NOT NULL DEFAULT 0
);
"#;

pub const INSERT_USER_IF_MISSING: &str = r#"
INSERT INTO users (user_id, privacy)
VALUES ($1, $2)
ON CONFLICT (user_id) DO NOTHING;
"#;

pub const SELECT_ALL_USERS: &str = r#"
SELECT user_id, privacy FROM users ORDER BY user_id;
"#;

pub const UPDATE_USER_PRIVACY: &str = r#"
UPDATE users SET privacy = $2 WHERE user_id = $1;
"#;

pub const INSERT_SPOT: &str = r#"
INSERT INTO spots (latd, longd, accuracy, altitude, speed, timestamp, user_id)
VALUES ($1, $2, $3, $4, $5, $6, $7);
"#;

pub const SELECT_ALL_SPOTS: &str = r#"
SELECT spot_id, latd, longd, accuracy, altitude, speed, timestamp, user_id
FROM spots
ORDER BY spot_id;
"#;

pub const SELECT_SPOTS_EXCEPT_USER: &str = r#"
SELECT spot_id, latd, longd, accuracy, altitude, speed, timestamp, user_id
FROM spots
WHERE user_id <> $1
ORDER BY spot_id;
"#;

pub const SELECT_USER_PATH: &str = r#"
SELECT spot_id, latd, longd, accuracy, altitude, speed, timestamp, user_id
FROM spots
WHERE user_id = $1
ORDER BY timestamp DESC, spot_id DESC;
"#;
