pub struct Icons;

impl Icons {
    pub const SEARCH: &str = "🔍";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const PENDING: &str = "⏳";
    pub const DEL: &str = "🗑️";
    pub const COIN: &str = "🪙";
}
