use chrono::Utc;
use contracts::domain::a003_product::ProductFilterQuery;
use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseBackend, FromQueryResult, Set, Statement, Value};
use serde::{Deserialize, Serialize};

use super::tree::ProductJoinRow;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category_id: Option<i64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Поля товара для вставки / обновления
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category_id: Option<i64>,
}

#[derive(Debug, FromQueryResult)]
struct IdRow {
    id: i64,
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    total: i64,
}

pub async fn insert<C: ConnectionTrait>(db: &C, product: &NewProduct) -> anyhow::Result<i64> {
    let now = Utc::now().to_rfc3339();
    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        name: Set(product.name.clone()),
        description: Set(product.description.clone()),
        price: Set(product.price),
        category_id: Set(product.category_id),
        created_at: Set(Some(now.clone())),
        updated_at: Set(Some(now)),
    };
    let model = active.insert(db).await?;
    Ok(model.id)
}

/// Обновить поля товара. false - товара с таким id нет
pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: i64,
    product: &NewProduct,
) -> anyhow::Result<bool> {
    use sea_orm::sea_query::Expr;
    let result = Entity::update_many()
        .col_expr(Column::Name, Expr::value(product.name.clone()))
        .col_expr(Column::Description, Expr::value(product.description.clone()))
        .col_expr(Column::Price, Expr::value(product.price))
        .col_expr(Column::CategoryId, Expr::value(product.category_id))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now().to_rfc3339()))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Удалить товар вместе с вариантами, изображениями и остатками.
/// Вызывать внутри транзакции.
pub async fn delete_cascade<C: ConnectionTrait>(db: &C, id: i64) -> anyhow::Result<bool> {
    let children = [
        "DELETE FROM images WHERE variant_id IN (SELECT id FROM product_variants WHERE product_id = ?)",
        "DELETE FROM stock WHERE variant_id IN (SELECT id FROM product_variants WHERE product_id = ?)",
        "DELETE FROM product_variants WHERE product_id = ?",
    ];
    for sql in children {
        db.execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            sql,
            vec![id.into()],
        ))
        .await?;
    }
    let result = Entity::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

pub async fn count<C: ConnectionTrait>(db: &C) -> anyhow::Result<u64> {
    let row = CountRow::find_by_statement(Statement::from_string(
        DatabaseBackend::Sqlite,
        "SELECT COUNT(*) AS total FROM products".to_string(),
    ))
    .one(db)
    .await?;
    Ok(row.map(|r| r.total.max(0) as u64).unwrap_or(0))
}

/// id товаров одной страницы (пагинация по товарам, а не по строкам JOIN)
pub async fn page_ids<C: ConnectionTrait>(
    db: &C,
    limit: u64,
    offset: u64,
) -> anyhow::Result<Vec<i64>> {
    let rows = IdRow::find_by_statement(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "SELECT id FROM products ORDER BY id LIMIT ? OFFSET ?",
        vec![to_sql_int(limit).into(), to_sql_int(offset).into()],
    ))
    .all(db)
    .await?;
    Ok(rows.into_iter().map(|r| r.id).collect())
}

/// u64 -> INTEGER SQLite без ухода в отрицательные (LIMIT -1 = без лимита)
fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Собрать WHERE для фильтра товаров
fn build_filter_sql(filter: &ProductFilterQuery) -> (String, Vec<Value>) {
    let mut sql = String::from("SELECT p.id AS id FROM products p WHERE 1=1");
    let mut params: Vec<Value> = Vec::new();

    if let Some(name) = filter.name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        sql.push_str(" AND p.name LIKE ?");
        params.push(format!("%{}%", name).into());
    }

    if let Some(category_id) = filter.category_id {
        sql.push_str(" AND p.category_id = ?");
        params.push(category_id.into());
    }

    if let Some(color) = filter.color.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        sql.push_str(
            " AND EXISTS (SELECT 1 FROM product_variants pv \
             WHERE pv.product_id = p.id AND UPPER(pv.color_hex) = UPPER(?))",
        );
        params.push(color.to_string().into());
    }

    if let Some(min_stock) = filter.min_stock {
        sql.push_str(
            " AND EXISTS (SELECT 1 FROM product_variants pv \
             JOIN stock s ON s.variant_id = pv.id \
             WHERE pv.product_id = p.id \
             GROUP BY pv.id HAVING SUM(s.quantity) >= ?)",
        );
        params.push(min_stock.into());
    }

    sql.push_str(" ORDER BY p.id");
    (sql, params)
}

pub async fn filter_ids<C: ConnectionTrait>(
    db: &C,
    filter: &ProductFilterQuery,
) -> anyhow::Result<Vec<i64>> {
    let (sql, params) = build_filter_sql(filter);
    let rows = IdRow::find_by_statement(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        &sql,
        params,
    ))
    .all(db)
    .await?;
    Ok(rows.into_iter().map(|r| r.id).collect())
}

/// Плоские строки товар x вариант x изображение x остаток для набора id
pub async fn load_tree_rows<C: ConnectionTrait>(
    db: &C,
    ids: &[i64],
) -> anyhow::Result<Vec<ProductJoinRow>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!(
        r#"
        SELECT
            p.id AS product_id,
            p.name AS product_name,
            p.category_id AS product_category_id,
            p.description AS product_description,
            p.price AS product_price,
            pv.id AS variant_id,
            pv.color_hex AS variant_color,
            i.id AS image_id,
            i.url AS image_url,
            i.order_index AS image_order_index,
            s.size_id AS size_id,
            s.quantity AS quantity,
            sz.name AS size_name
        FROM products p
        LEFT JOIN product_variants pv ON pv.product_id = p.id
        LEFT JOIN images i ON i.variant_id = pv.id
        LEFT JOIN stock s ON s.variant_id = pv.id
        LEFT JOIN sizes sz ON sz.id = s.size_id
        WHERE p.id IN ({})
        ORDER BY p.id, pv.id, i.order_index, i.id, s.id
        "#,
        placeholders
    );
    let params: Vec<Value> = ids.iter().map(|id| (*id).into()).collect();
    let rows = ProductJoinRow::find_by_statement(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        &sql,
        params,
    ))
    .all(db)
    .await?;
    Ok(rows)
}
