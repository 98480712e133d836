use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use bazaar_order::models::{
    FulfillmentStatus, LogisticsStatus, Order, OrderDraft, OrderTotals, PaymentStatus, Shipment,
    ShipmentStatus,
};
use bazaar_order::store::{OrderError, OrderStore};

pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_order(&self, row: OrderRow) -> Result<Order, OrderError> {
        let shipment_rows: Vec<ShipmentRow> = sqlx::query_as(
            "SELECT id, order_id, code, origin, items, provider_id, courier_name, courier_code, \
             shipping_cost, package_weight_kg, tracking_number, tracking_url, status, meta, \
             created_at, updated_at \
             FROM shipments WHERE order_id = $1 \
             ORDER BY split_part(code, '-SH', 2)::int",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        let mut shipments = Vec::with_capacity(shipment_rows.len());
        for s in shipment_rows {
            shipments.push(s.into_shipment()?);
        }
        row.into_order(shipments)
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    code: String,
    user_id: Option<Uuid>,
    address: serde_json::Value,
    items_total: f64,
    shipping_total: f64,
    discount: f64,
    grand_total: f64,
    payment_status: String,
    payment_id: Option<String>,
    fulfillment_status: String,
    logistics_status: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl OrderRow {
    fn into_order(self, shipments: Vec<Shipment>) -> Result<Order, OrderError> {
        Ok(Order {
            id: self.id,
            code: self.code,
            user_id: self.user_id,
            address: serde_json::from_value(self.address).map_err(storage_err)?,
            totals: OrderTotals {
                items_total: self.items_total,
                shipping_total: self.shipping_total,
                discount: self.discount,
                grand_total: self.grand_total,
            },
            payment_status: PaymentStatus::parse(&self.payment_status)
                .ok_or_else(|| bad_status("payment_status", &self.payment_status))?,
            payment_id: self.payment_id,
            fulfillment_status: FulfillmentStatus::parse(&self.fulfillment_status)
                .ok_or_else(|| bad_status("fulfillment_status", &self.fulfillment_status))?,
            logistics_status: LogisticsStatus::parse(&self.logistics_status)
                .ok_or_else(|| bad_status("logistics_status", &self.logistics_status))?,
            shipments,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ShipmentRow {
    id: Uuid,
    order_id: Uuid,
    code: String,
    origin: serde_json::Value,
    items: serde_json::Value,
    provider_id: Uuid,
    courier_name: String,
    courier_code: Option<String>,
    shipping_cost: f64,
    package_weight_kg: f64,
    tracking_number: Option<String>,
    tracking_url: Option<String>,
    status: String,
    meta: serde_json::Value,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl ShipmentRow {
    fn into_shipment(self) -> Result<Shipment, OrderError> {
        Ok(Shipment {
            id: self.id,
            order_id: self.order_id,
            code: self.code,
            origin: serde_json::from_value(self.origin).map_err(storage_err)?,
            items: serde_json::from_value(self.items).map_err(storage_err)?,
            provider_id: self.provider_id,
            courier_name: self.courier_name,
            courier_code: self.courier_code,
            shipping_cost: self.shipping_cost,
            package_weight_kg: self.package_weight_kg,
            tracking_number: self.tracking_number,
            tracking_url: self.tracking_url,
            status: ShipmentStatus::parse(&self.status)
                .ok_or_else(|| bad_status("shipment status", &self.status))?,
            meta: self.meta,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn storage_err(e: impl std::fmt::Display) -> OrderError {
    OrderError::Storage(e.to_string())
}

fn bad_status(field: &str, value: &str) -> OrderError {
    OrderError::Storage(format!("unrecognized {field} value: {value}"))
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create_order_with_shipments(&self, draft: &OrderDraft) -> Result<Order, OrderError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        // Dedicated sequence: unique codes even under concurrent checkouts.
        let seq: i64 = sqlx::query_scalar("SELECT nextval('order_code_seq')")
            .fetch_one(&mut *tx)
            .await
            .map_err(storage_err)?;

        let order = Order::from_draft(draft, format!("BZ-{seq}"))?;

        sqlx::query(
            "INSERT INTO orders (id, code, user_id, address, items_total, shipping_total, \
             discount, grand_total, payment_status, payment_id, fulfillment_status, \
             logistics_status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(order.id)
        .bind(&order.code)
        .bind(order.user_id)
        .bind(serde_json::to_value(&order.address).map_err(storage_err)?)
        .bind(order.totals.items_total)
        .bind(order.totals.shipping_total)
        .bind(order.totals.discount)
        .bind(order.totals.grand_total)
        .bind(order.payment_status.as_str())
        .bind(&order.payment_id)
        .bind(order.fulfillment_status.as_str())
        .bind(order.logistics_status.as_str())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        for shipment in &order.shipments {
            sqlx::query(
                "INSERT INTO shipments (id, order_id, code, origin, items, provider_id, \
                 courier_name, courier_code, shipping_cost, package_weight_kg, tracking_number, \
                 tracking_url, status, meta, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
            )
            .bind(shipment.id)
            .bind(shipment.order_id)
            .bind(&shipment.code)
            .bind(serde_json::to_value(&shipment.origin).map_err(storage_err)?)
            .bind(serde_json::to_value(&shipment.items).map_err(storage_err)?)
            .bind(shipment.provider_id)
            .bind(&shipment.courier_name)
            .bind(&shipment.courier_code)
            .bind(shipment.shipping_cost)
            .bind(shipment.package_weight_kg)
            .bind(&shipment.tracking_number)
            .bind(&shipment.tracking_url)
            .bind(shipment.status.as_str())
            .bind(&shipment.meta)
            .bind(shipment.created_at)
            .bind(shipment.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;
        }

        tx.commit().await.map_err(storage_err)?;
        Ok(order)
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, OrderError> {
        let row: Option<OrderRow> = sqlx::query_as(
            "SELECT id, code, user_id, address, items_total, shipping_total, discount, \
             grand_total, payment_status, payment_id, fulfillment_status, logistics_status, \
             created_at, updated_at FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        match row {
            Some(row) => Ok(Some(self.load_order(row).await?)),
            None => Ok(None),
        }
    }

    async fn get_order_by_code(&self, code: &str) -> Result<Option<Order>, OrderError> {
        let row: Option<OrderRow> = sqlx::query_as(
            "SELECT id, code, user_id, address, items_total, shipping_total, discount, \
             grand_total, payment_status, payment_id, fulfillment_status, logistics_status, \
             created_at, updated_at FROM orders WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        match row {
            Some(row) => Ok(Some(self.load_order(row).await?)),
            None => Ok(None),
        }
    }

    async fn mark_payment(
        &self,
        order_id: Uuid,
        status: PaymentStatus,
        payment_id: Option<String>,
    ) -> Result<(), OrderError> {
        let result = sqlx::query(
            "UPDATE orders SET payment_status = $1, payment_id = $2, updated_at = NOW() \
             WHERE id = $3",
        )
        .bind(status.as_str())
        .bind(&payment_id)
        .bind(order_id)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(OrderError::NotFound(order_id.to_string()));
        }
        Ok(())
    }

    async fn update_shipment_booking(
        &self,
        shipment_id: Uuid,
        status: ShipmentStatus,
        tracking_number: Option<String>,
        tracking_url: Option<String>,
        meta: serde_json::Value,
    ) -> Result<(), OrderError> {
        let result = sqlx::query(
            "UPDATE shipments SET status = $1, tracking_number = $2, tracking_url = $3, \
             meta = $4, updated_at = NOW() WHERE id = $5",
        )
        .bind(status.as_str())
        .bind(&tracking_number)
        .bind(&tracking_url)
        .bind(&meta)
        .bind(shipment_id)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(OrderError::NotFound(shipment_id.to_string()));
        }
        Ok(())
    }

    async fn update_tracking(
        &self,
        shipment_id: Uuid,
        tracking_number: String,
        tracking_url: Option<String>,
    ) -> Result<(), OrderError> {
        let result = sqlx::query(
            "UPDATE shipments SET tracking_number = $1, tracking_url = $2, updated_at = NOW() \
             WHERE id = $3",
        )
        .bind(&tracking_number)
        .bind(&tracking_url)
        .bind(shipment_id)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(OrderError::NotFound(shipment_id.to_string()));
        }
        Ok(())
    }

    async fn set_fulfillment_status(
        &self,
        order_id: Uuid,
        status: FulfillmentStatus,
    ) -> Result<(), OrderError> {
        let result = sqlx::query(
            "UPDATE orders SET fulfillment_status = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(status.as_str())
        .bind(order_id)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(OrderError::NotFound(order_id.to_string()));
        }
        Ok(())
    }
}
