// dashboard.rs
// Business statistics composed from concurrent record-store queries. Each
// sub-query fails independently: a backend error becomes empty data and a
// warning log, never a failed dashboard response.

use std::collections::BTreeMap;

use chrono::Datelike;
use mongodb::bson::oid::ObjectId;
use serde::Serialize;

use crate::error::StoreError;
use crate::models::{Car, CarStatus, RcRecord, SellLetter, ServiceBill};
use crate::store::{Scope, Store};

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_sell_letters: u64,
    pub total_buy_value: f64,
    pub total_sell_value: f64,
    pub profit: f64,
    pub recent_transactions: RecentTransactions,
    pub monthly_data: Vec<MonthlyEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub car_stats: Option<CarStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rc_stats: Option<RcStats>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTransactions {
    pub buy: Vec<Car>,
    pub sell: Vec<SellLetter>,
    pub service: Vec<ServiceBill>,
}

/// One merged month: a bucket appears when either series has activity and
/// the missing side reads zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyEntry {
    pub month: String,
    pub buy: u64,
    pub sell: u64,
    pub profit: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarStats {
    pub total_cars: u64,
    pub sold_cars: u64,
    pub available_cars: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RcStats {
    #[serde(rename = "totalRCs")]
    pub total_rcs: u64,
    pub rc_transferred: u64,
    pub rc_fee_done: u64,
    pub rc_fee_returned: u64,
    pub rc_available_to_transfer: u64,
    pub rc_fee_to_be_taken: u64,
}

/// Statistics over one staff member's records.
pub async fn owner_stats(store: &Store, user_id: &ObjectId) -> DashboardStats {
    scoped_stats(store, Scope::Owner(*user_id), false).await
}

/// Statistics over everything, with the fleet and RC breakdowns only the
/// admin view carries.
pub async fn global_stats(store: &Store) -> DashboardStats {
    scoped_stats(store, Scope::All, true).await
}

async fn scoped_stats(store: &Store, scope: Scope, include_global: bool) -> DashboardStats {
    let rc_query = async {
        if include_global {
            store.rcs.list(Scope::All).await
        } else {
            Ok(Vec::new())
        }
    };
    let (cars, letters, bills, rcs) = tokio::join!(
        store.cars.list(scope),
        store.sell_letters.list(scope),
        store.service_bills.list(scope),
        rc_query,
    );
    let cars = settle(cars, "cars");
    let letters = settle(letters, "sell letters");
    let bills = settle(bills, "service bills");
    let rcs = settle(rcs, "rc records");

    let total_buy_value: f64 = cars.iter().map(|car| car.buying_price).sum();
    let total_sell_value: f64 = letters.iter().map(|letter| letter.sale_amount).sum();

    DashboardStats {
        total_sell_letters: letters.len() as u64,
        total_buy_value,
        total_sell_value,
        profit: total_sell_value - total_buy_value,
        recent_transactions: RecentTransactions {
            buy: cars.iter().take(3).cloned().collect(),
            sell: letters.iter().take(3).cloned().collect(),
            service: bills.iter().take(3).cloned().collect(),
        },
        monthly_data: monthly_series(&cars, &letters),
        car_stats: include_global.then(|| car_stats(&cars)),
        rc_stats: include_global.then(|| rc_stats(&rcs)),
    }
}

fn settle<T>(result: Result<Vec<T>, StoreError>, query: &str) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(err) => {
            tracing::warn!(error = %err, query, "dashboard sub-query failed, substituting empty data");
            Vec::new()
        }
    }
}

/// Merge the buy series (cars by intake date) and the sell series (letters
/// by sale date) into one chronological (year, month) sequence.
fn monthly_series(cars: &[Car], letters: &[SellLetter]) -> Vec<MonthlyEntry> {
    #[derive(Default)]
    struct Bucket {
        buy: u64,
        buy_total: f64,
        sell: u64,
        sell_total: f64,
    }

    let mut buckets: BTreeMap<(i32, u32), Bucket> = BTreeMap::new();
    for car in cars {
        let Some(at) = car.created_at else { continue };
        let at = at.to_chrono();
        let bucket = buckets.entry((at.year(), at.month())).or_default();
        bucket.buy += 1;
        bucket.buy_total += car.buying_price;
    }
    for letter in letters {
        let at = letter.sale_date.to_chrono();
        let bucket = buckets.entry((at.year(), at.month())).or_default();
        bucket.sell += 1;
        bucket.sell_total += letter.sale_amount;
    }

    buckets
        .into_iter()
        .map(|((_, month), bucket)| MonthlyEntry {
            month: MONTH_LABELS[(month - 1) as usize].to_string(),
            buy: bucket.buy,
            sell: bucket.sell,
            profit: bucket.sell_total - bucket.buy_total,
        })
        .collect()
}

fn car_stats(cars: &[Car]) -> CarStats {
    let sold = cars
        .iter()
        .filter(|car| car.status == CarStatus::SoldOut)
        .count() as u64;
    let available = cars
        .iter()
        .filter(|car| car.status == CarStatus::Available)
        .count() as u64;
    CarStats {
        total_cars: cars.len() as u64,
        sold_cars: sold,
        available_cars: available,
    }
}

fn rc_stats(rcs: &[RcRecord]) -> RcStats {
    let total = rcs.len() as u64;
    let mut transferred = 0u64;
    let mut fee_done = 0u64;
    let mut fee_returned = 0u64;
    for record in rcs {
        let flags = record.effective_status();
        if flags.transferred {
            transferred += 1;
        }
        if flags.rto_fees_paid {
            fee_done += 1;
        }
        if flags.returned_to_dealer {
            fee_returned += 1;
        }
    }
    RcStats {
        total_rcs: total,
        rc_transferred: transferred,
        rc_fee_done: fee_done,
        rc_fee_returned: fee_returned,
        rc_available_to_transfer: total - transferred,
        rc_fee_to_be_taken: total - fee_done,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};
    use mongodb::bson::DateTime;

    fn bson_date(year: i32, month: u32, day: u32) -> DateTime {
        let at = Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap();
        DateTime::from_chrono(at)
    }

    fn car(buying_price: f64, year: i32, month: u32) -> Car {
        Car {
            id: Some(ObjectId::new()),
            make: "Maruti".into(),
            model: "Swift".into(),
            variant: None,
            manufacture_year: 2018,
            registration_year: None,
            chassis_number: ObjectId::new().to_hex(),
            engine_number: ObjectId::new().to_hex(),
            buying_price,
            quoting_price: None,
            selling_price: None,
            status: CarStatus::Available,
            photos: vec!["front.png".into()],
            sold: None,
            added_by: ObjectId::new(),
            created_at: Some(bson_date(year, month, 5)),
            updated_at: None,
        }
    }

    fn letter(sale_amount: f64, year: i32, month: u32) -> SellLetter {
        SellLetter {
            id: Some(ObjectId::new()),
            car_id: ObjectId::new(),
            buyer_name: "Buyer".into(),
            buyer_parentage: None,
            buyer_address: None,
            buyer_phone: "9999999999".into(),
            vehicle_name: "Swift".into(),
            vehicle_reg_no: None,
            chassis_number: "CH".into(),
            engine_number: "EN".into(),
            sale_amount,
            payment_method: "cash".into(),
            sale_date: bson_date(year, month, 20),
            created_by: ObjectId::new(),
            created_at: Some(bson_date(year, month, 20)),
            updated_at: None,
        }
    }

    #[test]
    fn disjoint_months_zero_fill_the_missing_side() {
        let cars = vec![car(200_000.0, 2024, 3), car(150_000.0, 2024, 3)];
        let letters = vec![letter(300_000.0, 2024, 4)];

        let series = monthly_series(&cars, &letters);
        assert_eq!(
            series,
            vec![
                MonthlyEntry {
                    month: "Mar".into(),
                    buy: 2,
                    sell: 0,
                    profit: -350_000.0,
                },
                MonthlyEntry {
                    month: "Apr".into(),
                    buy: 0,
                    sell: 1,
                    profit: 300_000.0,
                },
            ]
        );
    }

    #[test]
    fn buckets_sort_across_years() {
        let cars = vec![car(100.0, 2024, 1)];
        let letters = vec![letter(500.0, 2023, 12)];

        let series = monthly_series(&cars, &letters);
        assert_eq!(series[0].month, "Dec");
        assert_eq!(series[1].month, "Jan");
    }

    #[test]
    fn shared_month_nets_profit() {
        let cars = vec![car(100_000.0, 2024, 6)];
        let letters = vec![letter(160_000.0, 2024, 6)];

        let series = monthly_series(&cars, &letters);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].buy, 1);
        assert_eq!(series[0].sell, 1);
        assert_eq!(series[0].profit, 60_000.0);
    }

    #[test]
    fn undated_cars_stay_out_of_the_series() {
        let mut undated = car(100.0, 2024, 2);
        undated.created_at = None;
        let series = monthly_series(&[undated], &[]);
        assert!(series.is_empty());
    }

    #[test]
    fn fleet_counts_split_by_status() {
        let mut sold = car(1.0, 2024, 1);
        sold.status = CarStatus::SoldOut;
        let mut coming = car(1.0, 2024, 1);
        coming.status = CarStatus::ComingSoon;
        let stats = car_stats(&[car(1.0, 2024, 1), sold, coming]);

        assert_eq!(stats.total_cars, 3);
        assert_eq!(stats.sold_cars, 1);
        assert_eq!(stats.available_cars, 1);
    }

    fn rc() -> RcRecord {
        RcRecord {
            id: Some(ObjectId::new()),
            car_id: None,
            vehicle_reg_no: String::new(),
            vehicle_name: String::new(),
            owner_name: String::new(),
            owner_phone: String::new(),
            applicant_name: String::new(),
            applicant_phone: String::new(),
            work: String::new(),
            dealer_name: String::new(),
            rto_agent_name: String::new(),
            remarks: String::new(),
            status: crate::models::RcStatusFlags::default(),
            details: serde_json::Map::new(),
            pdf_url: None,
            pdf_public_id: None,
            created_by: ObjectId::new(),
            created_at: Some(DateTime::now()),
            updated_at: None,
        }
    }

    #[test]
    fn rc_counts_cover_column_and_legacy_flags() {
        let mut transferred = rc();
        transferred.status.transferred = true;
        transferred.status.rto_fees_paid = true;

        // A document written before the flags were promoted to columns.
        let mut legacy = rc();
        legacy.details.insert(
            "status".into(),
            serde_json::json!({ "transferred": "yes" }),
        );

        let stats = rc_stats(&[transferred, legacy, rc()]);
        assert_eq!(stats.total_rcs, 3);
        assert_eq!(stats.rc_transferred, 2);
        assert_eq!(stats.rc_fee_done, 1);
        assert_eq!(stats.rc_fee_returned, 0);
        assert_eq!(stats.rc_available_to_transfer, 1);
        assert_eq!(stats.rc_fee_to_be_taken, 2);
    }
}
