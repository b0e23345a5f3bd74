//! Admin Models

use jiff::civil::Date;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::orders::OrderStatus;

/// Shortest and longest report windows the server accepts, in days.
pub const REPORT_DAYS: std::ops::RangeInclusive<u32> = 1..=365;

/// Default report window.
pub const DEFAULT_REPORT_DAYS: u32 = 30;

/// Clamp a report window to what the server accepts.
#[must_use]
pub fn clamp_days(days: u32) -> u32 {
    days.clamp(*REPORT_DAYS.start(), *REPORT_DAYS.end())
}

/// Dashboard report.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Reports {
    pub totals: Totals,
    #[serde(default)]
    pub orders_by_day: Vec<DailyOrders>,
    #[serde(default)]
    pub revenue_by_day: Vec<DailyRevenue>,
    #[serde(default)]
    pub visits_by_day: Vec<DailyVisits>,
    #[serde(default)]
    pub order_statuses: FxHashMap<String, u64>,
    #[serde(default)]
    pub top_products: Vec<TopProduct>,
}

impl Reports {
    /// Orders counted under a status; statuses with no orders are absent from the report.
    #[must_use]
    pub fn orders_with_status(&self, status: OrderStatus) -> u64 {
        self.order_statuses
            .get(status.as_str())
            .copied()
            .unwrap_or_default()
    }

    /// Revenue across the per-day series.
    #[must_use]
    pub fn period_revenue(&self) -> f64 {
        self.revenue_by_day.iter().map(|day| day.revenue).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Totals {
    pub users: u64,
    pub orders: u64,
    pub products: u64,
    pub revenue: f64,
    #[serde(default)]
    pub visits: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DailyOrders {
    pub date: Date,
    pub orders: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DailyRevenue {
    pub date: Date,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DailyVisits {
    pub date: Date,
    #[serde(default)]
    pub visits: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopProduct {
    pub name: String,
    pub revenue: f64,
}

/// New staff account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}
