//! Catalog engine: product lifecycle, the like/unlike toggle and comment
//! attachment.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::policy;
use crate::config;
use crate::database::models::{Comment, Product, ProductLike, Profile};
use crate::database::repository::ColumnValues;
use crate::database::{Query, Repository, SortDirection, SqlParam, StoreError};
use crate::error::ApiError;

#[derive(Clone)]
pub struct CatalogService {
    products: Repository<Product>,
    comments: Repository<Comment>,
    profiles: Repository<Profile>,
    pool: PgPool,
}

/// Optional list filters plus pagination, as sent on the query string.
#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Number of items in this page, not the total match count.
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub image_base64: Option<String>,
    #[serde(default = "default_stock_quantity")]
    pub stock_quantity: i32,
}

fn default_stock_quantity() -> i32 {
    1
}

/// Partial patch: only fields present and non-null change the stored row.
#[derive(Debug, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub image_base64: Option<String>,
    pub stock_quantity: Option<i32>,
}

impl ProductPatch {
    fn into_columns(self) -> ColumnValues {
        let mut columns: ColumnValues = Vec::new();
        if let Some(name) = self.name {
            columns.push(("name", name.into()));
        }
        if let Some(description) = self.description {
            columns.push(("description", description.into()));
        }
        if let Some(price) = self.price {
            columns.push(("price", price.into()));
        }
        if let Some(category) = self.category {
            columns.push(("category", category.into()));
        }
        if let Some(image_base64) = self.image_base64 {
            columns.push(("image_base64", image_base64.into()));
        }
        if let Some(stock_quantity) = self.stock_quantity {
            columns.push(("stock_quantity", stock_quantity.into()));
        }
        columns
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentCreate {
    pub product_id: Uuid,
    pub content: String,
}

/// Comment with its author's display name resolved.
#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub user_name: Option<String>,
    pub content: String,
    pub created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Serialize)]
pub struct LikeOutcome {
    pub liked: bool,
    pub likes_count: i32,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            products: Repository::new("products", pool.clone()),
            comments: Repository::new("comments", pool.clone()),
            profiles: Repository::new("profiles", pool.clone()),
            pool,
        }
    }

    /// List products, newest first, with optional exact-match and substring
    /// filters. The returned count is the page cardinality, not the total
    /// match count.
    pub async fn list_products(&self, filter: ProductFilter) -> Result<ProductPage, ApiError> {
        let pagination = &config::config().pagination;

        let limit = filter.limit.unwrap_or(pagination.default_limit);
        if limit <= 0 {
            return Err(ApiError::field_error("limit", "Limit must be positive"));
        }
        let limit = limit.min(pagination.max_limit);

        let offset = filter.offset.unwrap_or(0);
        if offset < 0 {
            return Err(ApiError::field_error("offset", "Offset must be non-negative"));
        }

        let mut query = Query::new();
        if let Some(category) = filter.category {
            query = query.eq("category", category);
        }
        if let Some(country) = filter.country {
            query = query.eq("supplier_country", country);
        }
        if let Some(city) = filter.city {
            query = query.eq("supplier_city", city);
        }
        if let Some(search) = filter.search {
            query = query.ilike("name", format!("%{}%", escape_like(&search)));
        }
        let query = query
            .order_by("created_at", SortDirection::Desc)
            .order_by("seq", SortDirection::Asc)
            .limit(limit)
            .offset(offset);

        let products = self.products.find(query).await?;
        let count = products.len();
        Ok(ProductPage { products, count })
    }

    /// One product plus its comments, newest comment first.
    pub async fn get_product(&self, product_id: Uuid) -> Result<ProductDetail, ApiError> {
        let product = self.products.get_by_id(product_id).await?;

        let comments = self
            .comments
            .find(
                Query::new()
                    .eq("product_id", product_id)
                    .order_by("created_at", SortDirection::Desc)
                    .order_by("seq", SortDirection::Asc),
            )
            .await?;

        let author_ids: Vec<SqlParam> = distinct_ids(comments.iter().map(|c| c.user_id));
        let authors = if author_ids.is_empty() {
            Vec::new()
        } else {
            self.profiles.find(Query::new().is_in("id", author_ids)).await?
        };

        Ok(ProductDetail {
            product,
            comments: with_author_names(comments, &authors),
        })
    }

    /// Create a product for the calling supplier. The supplier's location is
    /// copied onto the product here and never re-synced afterwards.
    pub async fn create_product(
        &self,
        supplier_id: Uuid,
        request: ProductCreate,
    ) -> Result<Product, ApiError> {
        let profile = self
            .profiles
            .find_one(Query::new().eq("id", supplier_id))
            .await?
            .ok_or_else(|| ApiError::forbidden("Only suppliers can create products"))?;

        if !policy::can_create_product(profile.role) {
            return Err(ApiError::forbidden("Only suppliers can create products"));
        }

        validate_product_fields(
            Some(request.name.as_str()),
            Some(request.description.as_str()),
            Some(request.category.as_str()),
            Some(request.price),
            Some(request.stock_quantity),
        )?;

        let mut columns: ColumnValues = vec![
            ("id", Uuid::new_v4().into()),
            ("supplier_id", supplier_id.into()),
            ("name", request.name.into()),
            ("description", request.description.into()),
            ("price", request.price.into()),
            ("category", request.category.into()),
            ("stock_quantity", request.stock_quantity.into()),
            ("likes_count", SqlParam::Int(0)),
            ("supplier_country", profile.country.into()),
            ("supplier_city", profile.city.into()),
            ("created_at", Utc::now().into()),
        ];
        if let Some(image_base64) = request.image_base64 {
            columns.push(("image_base64", image_base64.into()));
        }

        Ok(self.products.insert(columns).await?)
    }

    /// Apply a partial patch to an owned product. Absent fields keep their
    /// stored values.
    pub async fn update_product(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        patch: ProductPatch,
    ) -> Result<Product, ApiError> {
        let product = self.products.get_by_id(product_id).await?;

        if !policy::can_mutate_product(user_id, &product) {
            return Err(ApiError::forbidden("Not authorized to update this product"));
        }

        validate_product_fields(
            patch.name.as_deref(),
            patch.description.as_deref(),
            patch.category.as_deref(),
            patch.price,
            patch.stock_quantity,
        )?;

        let columns = patch.into_columns();
        if columns.is_empty() {
            return Ok(product);
        }

        Ok(self.products.update(product_id, columns).await?)
    }

    /// Delete an owned product. Irreversible; the store cascades the delete
    /// to the product's likes and comments.
    pub async fn delete_product(&self, user_id: Uuid, product_id: Uuid) -> Result<(), ApiError> {
        let product = self.products.get_by_id(product_id).await?;

        if !policy::can_mutate_product(user_id, &product) {
            return Err(ApiError::forbidden("Not authorized to delete this product"));
        }

        Ok(self.products.delete(product_id).await?)
    }

    /// Toggle the (product, user) like pairing.
    ///
    /// At most one state transition per call: an existing pairing is removed,
    /// a missing one is created. The counter moves by a single atomic SQL
    /// update floored at zero, inside one transaction with the pairing write,
    /// so two sequential calls always alternate and never double-count.
    pub async fn toggle_like(&self, user_id: Uuid, product_id: Uuid) -> Result<LikeOutcome, ApiError> {
        // Missing products surface NotFound, never a silent no-op.
        let _ = self.products.get_by_id(product_id).await?;

        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let removed: Option<ProductLike> = sqlx::query_as(
            "DELETE FROM product_likes WHERE product_id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(product_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_err)?;

        let outcome = if removed.is_some() {
            let likes_count: i32 = sqlx::query_scalar(
                "UPDATE products SET likes_count = GREATEST(likes_count - 1, 0) \
                 WHERE id = $1 RETURNING likes_count",
            )
            .bind(product_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(store_err)?;

            LikeOutcome { liked: false, likes_count }
        } else {
            let inserted: Option<ProductLike> = sqlx::query_as(
                "INSERT INTO product_likes (product_id, user_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING RETURNING *",
            )
            .bind(product_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(store_err)?;

            let likes_count: i32 = if inserted.is_some() {
                sqlx::query_scalar(
                    "UPDATE products SET likes_count = likes_count + 1 \
                     WHERE id = $1 RETURNING likes_count",
                )
                .bind(product_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(store_err)?
            } else {
                // Pairing appeared concurrently; the counter already moved.
                sqlx::query_scalar("SELECT likes_count FROM products WHERE id = $1")
                    .bind(product_id)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(store_err)?
            };

            LikeOutcome { liked: true, likes_count }
        };

        tx.commit().await.map_err(store_err)?;
        Ok(outcome)
    }

    /// Attach a comment to a product. Any authenticated account may comment.
    pub async fn add_comment(&self, author_id: Uuid, request: CommentCreate) -> Result<Comment, ApiError> {
        if !policy::can_comment(author_id) {
            return Err(ApiError::forbidden("Not authorized to comment"));
        }

        if request.content.trim().is_empty() {
            return Err(ApiError::field_error("content", "Comment content is required"));
        }

        // Missing products surface NotFound.
        let _ = self.products.get_by_id(request.product_id).await?;

        let columns: ColumnValues = vec![
            ("id", Uuid::new_v4().into()),
            ("product_id", request.product_id.into()),
            ("user_id", author_id.into()),
            ("content", request.content.into()),
            ("created_at", Utc::now().into()),
        ];

        Ok(self.comments.insert(columns).await?)
    }
}

fn store_err(e: sqlx::Error) -> ApiError {
    StoreError::Sqlx(e).into()
}

fn distinct_ids(ids: impl Iterator<Item = Uuid>) -> Vec<SqlParam> {
    let mut seen = std::collections::HashSet::new();
    ids.filter(|id| seen.insert(*id)).map(SqlParam::from).collect()
}

fn with_author_names(comments: Vec<Comment>, authors: &[Profile]) -> Vec<CommentView> {
    let names: std::collections::HashMap<Uuid, &str> = authors
        .iter()
        .map(|profile| (profile.id, profile.full_name.as_str()))
        .collect();

    comments
        .into_iter()
        .map(|comment| CommentView {
            user_name: names.get(&comment.user_id).map(|name| name.to_string()),
            id: comment.id,
            product_id: comment.product_id,
            user_id: comment.user_id,
            content: comment.content,
            created_at: comment.created_at,
        })
        .collect()
}

/// Shared field validation for create and patch: `None` means the field is
/// not being set and is skipped.
fn validate_product_fields(
    name: Option<&str>,
    description: Option<&str>,
    category: Option<&str>,
    price: Option<f64>,
    stock_quantity: Option<i32>,
) -> Result<(), ApiError> {
    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(ApiError::field_error("name", "Name is required"));
        }
    }
    if let Some(description) = description {
        if description.trim().is_empty() {
            return Err(ApiError::field_error("description", "Description is required"));
        }
    }
    if let Some(category) = category {
        if category.trim().is_empty() {
            return Err(ApiError::field_error("category", "Category is required"));
        }
    }
    if let Some(price) = price {
        if !price.is_finite() || price < 0.0 {
            return Err(ApiError::field_error("price", "Price must be non-negative"));
        }
    }
    if let Some(stock_quantity) = stock_quantity {
        if stock_quantity < 0 {
            return Err(ApiError::field_error("stock_quantity", "Stock quantity must be non-negative"));
        }
    }
    Ok(())
}

/// Escape LIKE wildcards so a search term is matched as a literal substring.
fn escape_like(input: &str) -> String {
    input.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
