/// Column-name constants for the shortfall-kit schema.
/// Single source of truth for every input and output table.

/// Join-key column added to every input frame.
pub const KEY: &str = "Key";

// ── Weekly plan columns ─────────────────────────────────────────────────────
pub mod plan {
    pub const SALES_ORDER: &str = "SO#";
    pub const LINE_ITEM: &str = "LI";
    pub const MODULE: &str = "Module";
    pub const CELL_PSD: &str = "Cell PSD";
    pub const PED: &str = "PED";
    pub const DELIVERY_DATE: &str = "Delivery Date";

    pub const REQUIRED: [&str; 6] = [
        SALES_ORDER,
        LINE_ITEM,
        MODULE,
        CELL_PSD,
        PED,
        DELIVERY_DATE,
    ];
}

// ── Stock report columns ────────────────────────────────────────────────────
pub mod stock {
    pub const SALES_ORDER: &str = "So";
    pub const LINE_ITEM: &str = "Li";
    pub const ST_LOCATION: &str = "St Location";
    pub const TOTAL_STOCK: &str = "Total Stock";

    pub const REQUIRED: [&str; 4] = [SALES_ORDER, LINE_ITEM, ST_LOCATION, TOTAL_STOCK];
}

// ── Prior shortage-report columns ───────────────────────────────────────────
pub mod prior {
    pub const SALES_ORDER: &str = "SO#";
    pub const LINE_ITEM: &str = "LI";
    pub const COMMENT: &str = "Comment";

    pub const REQUIRED: [&str; 3] = [SALES_ORDER, LINE_ITEM, COMMENT];
}

// ── Storage locations ───────────────────────────────────────────────────────
// Part of the reconciliation recipe, not discovered from data. The primary
// location drives the shortage formula; the secondary totals are reported
// alongside it.
pub mod locations {
    pub const PRIMARY: i64 = 118;
    pub const SECONDARY_A: i64 = 75;
    pub const SECONDARY_B: i64 = 139;
}

// ── Shortage report columns ─────────────────────────────────────────────────
pub mod report {
    use super::KEY;

    pub const TOTAL_PLANNED_QTY: &str = "Total Planned Qty";
    pub const ALL_MODULES: &str = "All Modules";
    pub const CELL_PSD: &str = "Cell PSD";
    pub const PED: &str = "PED";
    pub const DELIVERY_DATE: &str = "Delivery Date";
    pub const STOCK_PRIMARY: &str = "Total Stock (118)";
    pub const STOCK_SECONDARY_A: &str = "Stock (75)";
    pub const STOCK_SECONDARY_B: &str = "Stock (139)";
    pub const SHORTAGE: &str = "Shortage";
    pub const COMMENT: &str = "Comment";

    /// Output column order of the final report.
    pub const COLUMNS: [&str; 11] = [
        KEY,
        TOTAL_PLANNED_QTY,
        ALL_MODULES,
        CELL_PSD,
        PED,
        DELIVERY_DATE,
        STOCK_PRIMARY,
        STOCK_SECONDARY_A,
        STOCK_SECONDARY_B,
        SHORTAGE,
        COMMENT,
    ];
}
