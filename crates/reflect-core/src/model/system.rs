// ── System domain types ──

/// Alert counters of one system.
///
/// All-or-nothing: the wire only carries the four counters together
/// (under `status.details.items`), and the summary only reports them
/// together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertCounts {
    pub normal: i64,
    pub warning: i64,
    pub fault: i64,
    pub unknown: i64,
}

/// One Reflect system (a deployed design plus its devices).
///
/// Optional fields are absent on older server versions; absence omits
/// the derived statistic rather than defaulting to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    pub id: i64,
    pub code: String,
    /// Namespacing key for the flattened summary statistics.
    pub name: String,
    pub status_message: String,
    pub alerts: Option<AlertCounts>,
    pub design_name: Option<String>,
    pub design_platform: Option<String>,
    /// Epoch milliseconds of when the running design started.
    pub uptime_epoch_millis: Option<i64>,
    /// Links the system to the device whose name equals this value.
    /// Best-effort: the join may not resolve.
    pub core_name: Option<String>,
}
