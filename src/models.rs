// models.rs
// Domain models shared by both storage engines, plus the pure merge and
// recompute rules that keep their derived fields consistent.

use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// User roles for authorization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Staff,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Staff => "staff",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "staff" => Some(UserRole::Staff),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Staff
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "active" => Some(UserStatus::Active),
            "inactive" => Some(UserStatus::Inactive),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, UserStatus::Active)
    }
}

impl Default for UserStatus {
    fn default() -> Self {
        UserStatus::Active
    }
}

/// Inventory status, stored with the legacy display spellings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CarStatus {
    #[serde(rename = "Available")]
    Available,
    #[serde(rename = "Coming Soon")]
    ComingSoon,
    #[serde(rename = "Sold Out")]
    SoldOut,
}

impl CarStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarStatus::Available => "Available",
            CarStatus::ComingSoon => "Coming Soon",
            CarStatus::SoldOut => "Sold Out",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "available" => Some(CarStatus::Available),
            "coming soon" => Some(CarStatus::ComingSoon),
            "sold out" => Some(CarStatus::SoldOut),
            _ => None,
        }
    }
}

impl Default for CarStatus {
    fn default() -> Self {
        CarStatus::Available
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Partial,
    Unpaid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Unpaid => "unpaid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "paid" => Some(PaymentStatus::Paid),
            "partial" => Some(PaymentStatus::Partial),
            "unpaid" => Some(PaymentStatus::Unpaid),
            _ => None,
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Unpaid
    }
}

/// Staff account. The password hash never leaves the server; responses go
/// through `routes::helpers::user_json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

/// Buyer details captured when a car is sold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoldInfo {
    pub sold_date: Option<DateTime>,
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    pub testimonial: Option<String>,
    #[serde(default)]
    pub customer_photos: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub make: String,
    pub model: String,
    pub variant: Option<String>,
    pub manufacture_year: i32,
    pub registration_year: Option<i32>,
    pub chassis_number: String,
    pub engine_number: String,
    pub buying_price: f64,
    pub quoting_price: Option<f64>,
    pub selling_price: Option<f64>,
    pub status: CarStatus,
    #[serde(default)]
    pub photos: Vec<String>,
    pub sold: Option<SoldInfo>,
    pub added_by: ObjectId,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

/// Record of a completed sale, with buyer and vehicle snapshots so the
/// letter stays readable even if the car record changes later.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellLetter {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub car_id: ObjectId,
    pub buyer_name: String,
    pub buyer_parentage: Option<String>,
    pub buyer_address: Option<String>,
    pub buyer_phone: String,
    pub vehicle_name: String,
    pub vehicle_reg_no: Option<String>,
    pub chassis_number: String,
    pub engine_number: String,
    pub sale_amount: f64,
    pub payment_method: String,
    pub sale_date: DateTime,
    pub created_by: ObjectId,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceItem {
    pub description: String,
    pub quantity: f64,
    pub rate: f64,
    #[serde(default)]
    pub amount: f64,
}

impl ServiceItem {
    pub fn recompute(&mut self) {
        self.amount = self.quantity * self.rate;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBill {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub vehicle_name: String,
    pub vehicle_reg_no: Option<String>,
    #[serde(default)]
    pub service_items: Vec<ServiceItem>,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub tax_rate: f64,
    #[serde(default)]
    pub tax_amount: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub grand_total: f64,
    #[serde(default)]
    pub advance_paid: f64,
    #[serde(default)]
    pub balance_due: f64,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub pdf_url: Option<String>,
    pub pdf_public_id: Option<String>,
    pub created_by: ObjectId,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

impl ServiceBill {
    /// Recompute every derived billing field from the line items and the
    /// tax/discount/advance inputs. Call after any of those change.
    pub fn recompute_totals(&mut self) {
        for item in &mut self.service_items {
            item.recompute();
        }
        self.total_amount = self.service_items.iter().map(|item| item.amount).sum();
        self.tax_amount = self.total_amount * self.tax_rate / 100.0;
        self.grand_total = self.total_amount + self.tax_amount - self.discount;
        self.balance_due = self.grand_total - self.advance_paid;
        self.payment_status = if self.balance_due <= 0.0 {
            PaymentStatus::Paid
        } else if self.advance_paid > 0.0 {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Unpaid
        };
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RcStatusFlags {
    #[serde(default)]
    pub rto_fees_paid: bool,
    #[serde(default)]
    pub transferred: bool,
    #[serde(default)]
    pub returned_to_dealer: bool,
}

/// Promoted RC text fields, in the wire spelling used as both the column
/// accessor key and the `details` mirror key.
pub const RC_TEXT_FIELDS: [&str; 10] = [
    "vehicleRegNo",
    "vehicleName",
    "ownerName",
    "ownerPhone",
    "applicantName",
    "applicantPhone",
    "work",
    "dealerName",
    "rtoAgentName",
    "remarks",
];

/// Registration-certificate transfer record. Promoted columns are the source
/// of truth; `details` mirrors them for legacy documents and keeps any extra
/// keys migrations never promoted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RcRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub car_id: Option<ObjectId>,
    #[serde(default)]
    pub vehicle_reg_no: String,
    #[serde(default)]
    pub vehicle_name: String,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub owner_phone: String,
    #[serde(default)]
    pub applicant_name: String,
    #[serde(default)]
    pub applicant_phone: String,
    #[serde(default)]
    pub work: String,
    #[serde(default)]
    pub dealer_name: String,
    #[serde(default)]
    pub rto_agent_name: String,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub status: RcStatusFlags,
    #[serde(default)]
    pub details: Map<String, Value>,
    pub pdf_url: Option<String>,
    pub pdf_public_id: Option<String>,
    pub created_by: ObjectId,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

impl RcRecord {
    fn text_column(&self, key: &str) -> Option<&str> {
        let value = match key {
            "vehicleRegNo" => &self.vehicle_reg_no,
            "vehicleName" => &self.vehicle_name,
            "ownerName" => &self.owner_name,
            "ownerPhone" => &self.owner_phone,
            "applicantName" => &self.applicant_name,
            "applicantPhone" => &self.applicant_phone,
            "work" => &self.work,
            "dealerName" => &self.dealer_name,
            "rtoAgentName" => &self.rto_agent_name,
            "remarks" => &self.remarks,
            _ => return None,
        };
        Some(value.as_str())
    }

    fn text_column_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "vehicleRegNo" => Some(&mut self.vehicle_reg_no),
            "vehicleName" => Some(&mut self.vehicle_name),
            "ownerName" => Some(&mut self.owner_name),
            "ownerPhone" => Some(&mut self.owner_phone),
            "applicantName" => Some(&mut self.applicant_name),
            "applicantPhone" => Some(&mut self.applicant_phone),
            "work" => Some(&mut self.work),
            "dealerName" => Some(&mut self.dealer_name),
            "rtoAgentName" => Some(&mut self.rto_agent_name),
            "remarks" => Some(&mut self.remarks),
            _ => None,
        }
    }

    /// Merge an update into the record: incoming `details` keys are merged
    /// and recognized ones promoted to columns, explicit top-level fields win
    /// over the blob, and the mirror is rewritten so columns and `details`
    /// agree afterwards.
    pub fn apply_patch(&mut self, mut patch: RcPatch) {
        if let Some(incoming) = patch.details.take() {
            for (key, value) in incoming {
                self.details.insert(key, value);
            }
            self.promote_details();
        }

        for key in RC_TEXT_FIELDS {
            if let Some(value) = patch.text_field(key) {
                if let Some(column) = self.text_column_mut(key) {
                    *column = value;
                }
            }
        }
        if let Some(status) = patch.status {
            if let Some(flag) = status.rto_fees_paid {
                self.status.rto_fees_paid = flag;
            }
            if let Some(flag) = status.transferred {
                self.status.transferred = flag;
            }
            if let Some(flag) = status.returned_to_dealer {
                self.status.returned_to_dealer = flag;
            }
        }
        if let Some(car_id) = patch.car_id {
            self.car_id = Some(car_id);
        }
        if let Some(url) = patch.pdf_url {
            self.pdf_url = Some(url);
        }
        if let Some(public_id) = patch.pdf_public_id {
            self.pdf_public_id = Some(public_id);
        }

        self.sync_details();
    }

    fn promote_details(&mut self) {
        for key in RC_TEXT_FIELDS {
            let promoted = self
                .details
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string);
            if let Some(text) = promoted {
                if let Some(column) = self.text_column_mut(key) {
                    *column = text;
                }
            }
        }
        if let Some(status) = self.details.get("status").cloned() {
            if let Some(map) = status.as_object() {
                if let Some(flag) = map.get("rtoFeesPaid").and_then(as_flag) {
                    self.status.rto_fees_paid = flag;
                }
                if let Some(flag) = map.get("transferred").and_then(as_flag) {
                    self.status.transferred = flag;
                }
                if let Some(flag) = map.get("returnedToDealer").and_then(as_flag) {
                    self.status.returned_to_dealer = flag;
                }
            }
        }
        for key in ["pdfUrl", "pdfPublicId"] {
            let promoted = self
                .details
                .get(key)
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .map(str::to_string);
            if let Some(text) = promoted {
                match key {
                    "pdfUrl" => self.pdf_url = Some(text),
                    _ => self.pdf_public_id = Some(text),
                }
            }
        }
    }

    /// Flags as a reader sees them: column value, falling back to the
    /// `details` mirror for documents that predate the promoted columns.
    pub fn effective_status(&self) -> RcStatusFlags {
        let detail = self.details.get("status").and_then(Value::as_object);
        let get = |key: &str| {
            detail
                .and_then(|map| map.get(key))
                .and_then(as_flag)
                .unwrap_or(false)
        };
        RcStatusFlags {
            rto_fees_paid: self.status.rto_fees_paid || get("rtoFeesPaid"),
            transferred: self.status.transferred || get("transferred"),
            returned_to_dealer: self.status.returned_to_dealer || get("returnedToDealer"),
        }
    }

    /// Rewrite the `details` mirror from the columns.
    pub fn sync_details(&mut self) {
        for key in RC_TEXT_FIELDS {
            if let Some(value) = self.text_column(key) {
                self.details
                    .insert(key.to_string(), Value::String(value.to_string()));
            }
        }
        self.details.insert(
            "status".to_string(),
            json!({
                "rtoFeesPaid": self.status.rto_fees_paid,
                "transferred": self.status.transferred,
                "returnedToDealer": self.status.returned_to_dealer,
            }),
        );
        if let Some(url) = &self.pdf_url {
            self.details
                .insert("pdfUrl".to_string(), Value::String(url.clone()));
        }
        if let Some(public_id) = &self.pdf_public_id {
            self.details
                .insert("pdfPublicId".to_string(), Value::String(public_id.clone()));
        }
    }
}

/// Legacy blobs store flags as booleans or as "true"/"false" strings.
pub fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => match text.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|v| v != 0),
        _ => None,
    }
}

/// One stored album entry: ordered photo references plus optional car link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub photos: Vec<String>,
    pub car_id: Option<ObjectId>,
    pub caption: Option<String>,
    pub testimonial: Option<String>,
    pub created_by: ObjectId,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub description: String,
    pub cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Refurbishment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub car_id: ObjectId,
    #[serde(default)]
    pub work_items: Vec<WorkItem>,
    pub notes: Option<String>,
    pub created_by: ObjectId,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancePayment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub sell_letter_id: ObjectId,
    pub amount: f64,
    pub payment_method: String,
    pub payment_date: DateTime,
    pub note: Option<String>,
    pub received_by: ObjectId,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

// Partial updates. A `None` field leaves the stored value unchanged; both
// storage engines apply these through the same code path.

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}

impl UserPatch {
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(hash) = self.password_hash {
            user.password_hash = hash;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(status) = self.status {
            user.status = status;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CarPatch {
    pub make: Option<String>,
    pub model: Option<String>,
    pub variant: Option<String>,
    pub manufacture_year: Option<i32>,
    pub registration_year: Option<i32>,
    pub chassis_number: Option<String>,
    pub engine_number: Option<String>,
    pub buying_price: Option<f64>,
    pub quoting_price: Option<f64>,
    pub selling_price: Option<f64>,
    pub status: Option<CarStatus>,
    pub photos: Option<Vec<String>>,
    pub sold: Option<SoldInfo>,
}

impl CarPatch {
    pub fn apply(self, car: &mut Car) {
        if let Some(make) = self.make {
            car.make = make;
        }
        if let Some(model) = self.model {
            car.model = model;
        }
        if let Some(variant) = self.variant {
            car.variant = Some(variant);
        }
        if let Some(year) = self.manufacture_year {
            car.manufacture_year = year;
        }
        if let Some(year) = self.registration_year {
            car.registration_year = Some(year);
        }
        if let Some(chassis) = self.chassis_number {
            car.chassis_number = chassis;
        }
        if let Some(engine) = self.engine_number {
            car.engine_number = engine;
        }
        if let Some(price) = self.buying_price {
            car.buying_price = price;
        }
        if let Some(price) = self.quoting_price {
            car.quoting_price = Some(price);
        }
        if let Some(price) = self.selling_price {
            car.selling_price = Some(price);
        }
        if let Some(status) = self.status {
            car.status = status;
        }
        if let Some(photos) = self.photos {
            car.photos = photos;
        }
        if let Some(sold) = self.sold {
            car.sold = Some(sold);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SellLetterPatch {
    pub buyer_name: Option<String>,
    pub buyer_parentage: Option<String>,
    pub buyer_address: Option<String>,
    pub buyer_phone: Option<String>,
    pub vehicle_name: Option<String>,
    pub vehicle_reg_no: Option<String>,
    pub sale_amount: Option<f64>,
    pub payment_method: Option<String>,
    pub sale_date: Option<DateTime>,
}

impl SellLetterPatch {
    pub fn apply(self, letter: &mut SellLetter) {
        if let Some(name) = self.buyer_name {
            letter.buyer_name = name;
        }
        if let Some(parentage) = self.buyer_parentage {
            letter.buyer_parentage = Some(parentage);
        }
        if let Some(address) = self.buyer_address {
            letter.buyer_address = Some(address);
        }
        if let Some(phone) = self.buyer_phone {
            letter.buyer_phone = phone;
        }
        if let Some(name) = self.vehicle_name {
            letter.vehicle_name = name;
        }
        if let Some(reg_no) = self.vehicle_reg_no {
            letter.vehicle_reg_no = Some(reg_no);
        }
        if let Some(amount) = self.sale_amount {
            letter.sale_amount = amount;
        }
        if let Some(method) = self.payment_method {
            letter.payment_method = method;
        }
        if let Some(date) = self.sale_date {
            letter.sale_date = date;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServiceBillPatch {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub vehicle_name: Option<String>,
    pub vehicle_reg_no: Option<String>,
    pub service_items: Option<Vec<ServiceItem>>,
    pub tax_rate: Option<f64>,
    pub discount: Option<f64>,
    pub advance_paid: Option<f64>,
    pub pdf_url: Option<String>,
    pub pdf_public_id: Option<String>,
}

impl ServiceBillPatch {
    /// Apply the patch; derived billing fields are recomputed when any of
    /// their inputs were part of it.
    pub fn apply(self, bill: &mut ServiceBill) {
        let recompute = self.service_items.is_some()
            || self.tax_rate.is_some()
            || self.discount.is_some()
            || self.advance_paid.is_some();

        if let Some(name) = self.customer_name {
            bill.customer_name = name;
        }
        if let Some(phone) = self.customer_phone {
            bill.customer_phone = Some(phone);
        }
        if let Some(name) = self.vehicle_name {
            bill.vehicle_name = name;
        }
        if let Some(reg_no) = self.vehicle_reg_no {
            bill.vehicle_reg_no = Some(reg_no);
        }
        if let Some(items) = self.service_items {
            bill.service_items = items;
        }
        if let Some(rate) = self.tax_rate {
            bill.tax_rate = rate;
        }
        if let Some(discount) = self.discount {
            bill.discount = discount;
        }
        if let Some(advance) = self.advance_paid {
            bill.advance_paid = advance;
        }
        if let Some(url) = self.pdf_url {
            bill.pdf_url = Some(url);
        }
        if let Some(public_id) = self.pdf_public_id {
            bill.pdf_public_id = Some(public_id);
        }

        if recompute {
            bill.recompute_totals();
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RcStatusPatch {
    pub rto_fees_paid: Option<bool>,
    pub transferred: Option<bool>,
    pub returned_to_dealer: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct RcPatch {
    pub car_id: Option<ObjectId>,
    pub vehicle_reg_no: Option<String>,
    pub vehicle_name: Option<String>,
    pub owner_name: Option<String>,
    pub owner_phone: Option<String>,
    pub applicant_name: Option<String>,
    pub applicant_phone: Option<String>,
    pub work: Option<String>,
    pub dealer_name: Option<String>,
    pub rto_agent_name: Option<String>,
    pub remarks: Option<String>,
    pub status: Option<RcStatusPatch>,
    pub details: Option<Map<String, Value>>,
    pub pdf_url: Option<String>,
    pub pdf_public_id: Option<String>,
}

impl RcPatch {
    fn text_field(&self, key: &str) -> Option<String> {
        let value = match key {
            "vehicleRegNo" => &self.vehicle_reg_no,
            "vehicleName" => &self.vehicle_name,
            "ownerName" => &self.owner_name,
            "ownerPhone" => &self.owner_phone,
            "applicantName" => &self.applicant_name,
            "applicantPhone" => &self.applicant_phone,
            "work" => &self.work,
            "dealerName" => &self.dealer_name,
            "rtoAgentName" => &self.rto_agent_name,
            "remarks" => &self.remarks,
            _ => &None,
        };
        value.clone()
    }
}

#[derive(Debug, Clone, Default)]
pub struct GalleryPatch {
    pub photos: Option<Vec<String>>,
    pub car_id: Option<ObjectId>,
    pub caption: Option<String>,
    pub testimonial: Option<String>,
}

impl GalleryPatch {
    pub fn apply(self, item: &mut GalleryItem) {
        if let Some(photos) = self.photos {
            item.photos = photos;
        }
        if let Some(car_id) = self.car_id {
            item.car_id = Some(car_id);
        }
        if let Some(caption) = self.caption {
            item.caption = Some(caption);
        }
        if let Some(testimonial) = self.testimonial {
            item.testimonial = Some(testimonial);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RefurbishmentPatch {
    pub work_items: Option<Vec<WorkItem>>,
    pub notes: Option<String>,
}

impl RefurbishmentPatch {
    pub fn apply(self, refurbishment: &mut Refurbishment) {
        if let Some(items) = self.work_items {
            refurbishment.work_items = items;
        }
        if let Some(notes) = self.notes {
            refurbishment.notes = Some(notes);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdvancePaymentPatch {
    pub amount: Option<f64>,
    pub payment_method: Option<String>,
    pub payment_date: Option<DateTime>,
    pub note: Option<String>,
}

impl AdvancePaymentPatch {
    pub fn apply(self, payment: &mut AdvancePayment) {
        if let Some(amount) = self.amount {
            payment.amount = amount;
        }
        if let Some(method) = self.payment_method {
            payment.payment_method = method;
        }
        if let Some(date) = self.payment_date {
            payment.payment_date = date;
        }
        if let Some(note) = self.note {
            payment.note = Some(note);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    fn bare_bill(items: Vec<ServiceItem>) -> ServiceBill {
        ServiceBill {
            id: None,
            customer_name: "Test Customer".into(),
            customer_phone: None,
            vehicle_name: "Swift".into(),
            vehicle_reg_no: None,
            service_items: items,
            total_amount: 0.0,
            tax_rate: 0.0,
            tax_amount: 0.0,
            discount: 0.0,
            grand_total: 0.0,
            advance_paid: 0.0,
            balance_due: 0.0,
            payment_status: PaymentStatus::Unpaid,
            pdf_url: None,
            pdf_public_id: None,
            created_by: ObjectId::new(),
            created_at: Some(DateTime::now()),
            updated_at: None,
        }
    }

    fn item(quantity: f64, rate: f64) -> ServiceItem {
        ServiceItem {
            description: "work".into(),
            quantity,
            rate,
            amount: 0.0,
        }
    }

    #[test]
    fn bill_totals_follow_items() {
        let mut bill = bare_bill(vec![item(2.0, 150.0), item(1.0, 700.0)]);
        bill.tax_rate = 10.0;
        bill.discount = 50.0;
        bill.advance_paid = 500.0;
        bill.recompute_totals();

        assert_eq!(bill.service_items[0].amount, 300.0);
        assert_eq!(bill.total_amount, 1000.0);
        assert_eq!(bill.tax_amount, 100.0);
        assert_eq!(bill.grand_total, 1050.0);
        assert_eq!(bill.balance_due, 550.0);
        assert_eq!(bill.payment_status, PaymentStatus::Partial);
    }

    #[test]
    fn empty_item_list_zeroes_totals() {
        let mut bill = bare_bill(Vec::new());
        bill.recompute_totals();
        assert_eq!(bill.total_amount, 0.0);
        assert_eq!(bill.grand_total, 0.0);
        assert_eq!(bill.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn payment_status_tracks_balance() {
        let mut bill = bare_bill(vec![item(1.0, 100.0)]);
        bill.recompute_totals();
        assert_eq!(bill.payment_status, PaymentStatus::Unpaid);

        bill.advance_paid = 40.0;
        bill.recompute_totals();
        assert_eq!(bill.payment_status, PaymentStatus::Partial);

        bill.advance_paid = 100.0;
        bill.recompute_totals();
        assert_eq!(bill.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn patch_without_billing_fields_keeps_totals() {
        let mut bill = bare_bill(vec![item(1.0, 100.0)]);
        bill.recompute_totals();
        let before = bill.grand_total;

        let patch = ServiceBillPatch {
            customer_name: Some("Renamed".into()),
            ..Default::default()
        };
        patch.apply(&mut bill);
        assert_eq!(bill.grand_total, before);
        assert_eq!(bill.customer_name, "Renamed");
    }

    proptest! {
        #[test]
        fn bill_invariants_hold(
            quantities in proptest::collection::vec((0.0f64..50.0, 0.0f64..10_000.0), 0..8),
            tax_rate in 0.0f64..30.0,
            discount in 0.0f64..1_000.0,
            advance in 0.0f64..10_000.0,
        ) {
            let items = quantities.iter().map(|(q, r)| item(*q, *r)).collect();
            let mut bill = bare_bill(items);
            bill.tax_rate = tax_rate;
            bill.discount = discount;
            bill.advance_paid = advance;
            bill.recompute_totals();

            let expected_total: f64 = bill
                .service_items
                .iter()
                .map(|i| i.quantity * i.rate)
                .sum();
            prop_assert!((bill.total_amount - expected_total).abs() < 1e-6);
            prop_assert!(
                (bill.grand_total - (bill.total_amount + bill.tax_amount - bill.discount)).abs()
                    < 1e-6
            );
            prop_assert!((bill.balance_due - (bill.grand_total - bill.advance_paid)).abs() < 1e-6);
        }
    }

    fn bare_rc() -> RcRecord {
        RcRecord {
            id: None,
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
            status: RcStatusFlags::default(),
            details: Map::new(),
            pdf_url: None,
            pdf_public_id: None,
            created_by: ObjectId::new(),
            created_at: Some(DateTime::now()),
            updated_at: None,
        }
    }

    #[test]
    fn details_status_write_promotes_to_column() {
        let mut rc = bare_rc();
        let mut details = Map::new();
        details.insert("status".into(), json!({ "rtoFeesPaid": true }));

        rc.apply_patch(RcPatch {
            details: Some(details),
            ..Default::default()
        });

        assert!(rc.status.rto_fees_paid);
        assert_eq!(
            rc.details.get("status").and_then(|s| s.get("rtoFeesPaid")),
            Some(&Value::Bool(true))
        );
    }

    #[test]
    fn rc_merge_is_idempotent() {
        let mut rc = bare_rc();
        let mut details = Map::new();
        details.insert("ownerName".into(), Value::String("Ravi".into()));
        details.insert("status".into(), json!({ "transferred": true }));
        let patch = RcPatch {
            details: Some(details.clone()),
            ..Default::default()
        };

        rc.apply_patch(patch.clone());
        let first = rc.clone();
        rc.apply_patch(patch);

        assert_eq!(rc.owner_name, first.owner_name);
        assert_eq!(rc.status, first.status);
        assert_eq!(rc.details, first.details);
    }

    #[test]
    fn top_level_patch_overrides_details() {
        let mut rc = bare_rc();
        let mut details = Map::new();
        details.insert("ownerName".into(), Value::String("from details".into()));

        rc.apply_patch(RcPatch {
            owner_name: Some("from column".into()),
            details: Some(details),
            ..Default::default()
        });

        assert_eq!(rc.owner_name, "from column");
        assert_eq!(
            rc.details.get("ownerName"),
            Some(&Value::String("from column".into()))
        );
    }

    #[test]
    fn legacy_string_flags_are_recognized() {
        let mut rc = bare_rc();
        let mut details = Map::new();
        details.insert("status".into(), json!({ "transferred": "true" }));

        rc.apply_patch(RcPatch {
            details: Some(details),
            ..Default::default()
        });
        assert!(rc.status.transferred);
    }

    #[test]
    fn unrecognized_details_keys_survive_merge() {
        let mut rc = bare_rc();
        let mut details = Map::new();
        details.insert("oldMigrationField".into(), Value::String("kept".into()));

        rc.apply_patch(RcPatch {
            details: Some(details),
            ..Default::default()
        });
        assert_eq!(
            rc.details.get("oldMigrationField"),
            Some(&Value::String("kept".into()))
        );
    }
}
