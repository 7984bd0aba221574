pub mod limits {

    pub const USERNAME_MAX: usize = 30;

    pub const EMAIL_MAX: usize = 120;

    pub const PASSWORD_HASH_MAX: usize = 255;

    pub const SALT_MAX: usize = 64;
}

pub mod defaults {

    /// How far in the future a credential's `last_changed` may lie.
    pub const CLOCK_SKEW_TOLERANCE_MINUTES: i64 = 5;
}
