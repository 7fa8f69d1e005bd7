pub struct Icons;

impl Icons {
    pub const COFFEE: &str = "☕";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const STATS: &str = "📊";
    pub const LINK: &str = "🔗";
    pub const DATABASE: &str = "🗄️";
    pub const TRUCK: &str = "🚚";
    pub const MONEY: &str = "💲";
    pub const SCROLL: &str = "📜";
    pub const EMPTY: &str = "∅";
}
