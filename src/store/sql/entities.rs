// store/sql/entities.rs
// Table definitions for the relational engine. Ids are the same 24-char hex
// strings the document engine assigns, so records keep their identity when a
// deployment switches backends. Nested collections live in Json columns.

pub mod user {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub name: String,
        #[sea_orm(unique)]
        pub email: String,
        pub password_hash: String,
        pub role: String,
        pub status: String,
        pub created_at: Option<DateTimeUtc>,
        pub updated_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod car {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "cars")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
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
        pub status: String,
        pub photos: Json,
        pub sold: Option<Json>,
        pub added_by: String,
        pub created_at: Option<DateTimeUtc>,
        pub updated_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod sell_letter {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "sell_letters")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub car_id: String,
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
        pub sale_date: DateTimeUtc,
        pub created_by: String,
        pub created_at: Option<DateTimeUtc>,
        pub updated_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod service_bill {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "service_bills")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub customer_name: String,
        pub customer_phone: Option<String>,
        pub vehicle_name: String,
        pub vehicle_reg_no: Option<String>,
        pub service_items: Json,
        pub total_amount: f64,
        pub tax_rate: f64,
        pub tax_amount: f64,
        pub discount: f64,
        pub grand_total: f64,
        pub advance_paid: f64,
        pub balance_due: f64,
        pub payment_status: String,
        pub pdf_url: Option<String>,
        pub pdf_public_id: Option<String>,
        pub created_by: String,
        pub created_at: Option<DateTimeUtc>,
        pub updated_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod rc {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "rcs")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub car_id: Option<String>,
        pub vehicle_reg_no: String,
        pub vehicle_name: String,
        pub owner_name: String,
        pub owner_phone: String,
        pub applicant_name: String,
        pub applicant_phone: String,
        pub work: String,
        pub dealer_name: String,
        pub rto_agent_name: String,
        pub remarks: String,
        pub rto_fees_paid: bool,
        pub transferred: bool,
        pub returned_to_dealer: bool,
        pub details: Json,
        pub pdf_url: Option<String>,
        pub pdf_public_id: Option<String>,
        pub created_by: String,
        pub created_at: Option<DateTimeUtc>,
        pub updated_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod gallery_item {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "gallery_items")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub photos: Json,
        pub car_id: Option<String>,
        pub caption: Option<String>,
        pub testimonial: Option<String>,
        pub created_by: String,
        pub created_at: Option<DateTimeUtc>,
        pub updated_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod refurbishment {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "refurbishments")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub car_id: String,
        pub work_items: Json,
        pub notes: Option<String>,
        pub created_by: String,
        pub created_at: Option<DateTimeUtc>,
        pub updated_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod advance_payment {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "advance_payments")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub sell_letter_id: String,
        pub amount: f64,
        pub payment_method: String,
        pub payment_date: DateTimeUtc,
        pub note: Option<String>,
        pub received_by: String,
        pub created_at: Option<DateTimeUtc>,
        pub updated_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
