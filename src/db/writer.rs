//! Parent-plus-children writes.
//!
//! The parent row is inserted (or updated) first. Every child collection is
//! then written with the parent's id. Sibling collections run concurrently.
//! Nothing is rolled back on failure: rows written before the failing step
//! stay in the database and the error says which collections made it.

use std::marker::PhantomData;

use async_trait::async_trait;
use futures::future::join_all;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{db::DbPool, errors::ServiceError};

/// Models that can act as the parent of a multi-step write.
pub trait Identified {
    fn row_id(&self) -> Uuid;
}

/// One dependent collection of a multi-step write.
#[async_trait]
pub trait ChildRows: Send + Sync {
    /// Name reported back in [`WriteOutcome`] and partial-write errors.
    fn label(&self) -> &'static str;

    /// Inserts every row of the collection tagged with `parent_id`.
    async fn write(&self, db: &DbPool, parent_id: Uuid) -> Result<u64, DbErr>;

    /// Deletes the rows currently attached to `parent_id`.
    async fn clear(&self, _db: &DbPool, _parent_id: Uuid) -> Result<u64, DbErr> {
        Err(DbErr::Custom(format!(
            "collection '{}' cannot be replaced",
            self.label()
        )))
    }
}

/// A flat batch of rows for entity `E`, built once the parent id is known.
pub struct RowBatch<E, F>
where
    E: EntityTrait,
{
    label: &'static str,
    parent_column: E::Column,
    build: F,
    _entity: PhantomData<fn() -> E>,
}

impl<E, F> RowBatch<E, F>
where
    E: EntityTrait,
    F: Fn(Uuid) -> Vec<E::ActiveModel> + Send + Sync,
{
    pub fn new(label: &'static str, parent_column: E::Column, build: F) -> Self {
        Self {
            label,
            parent_column,
            build,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E, F> ChildRows for RowBatch<E, F>
where
    E: EntityTrait,
    E::Column: Send + Sync,
    E::Model: IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
    F: Fn(Uuid) -> Vec<E::ActiveModel> + Send + Sync,
{
    fn label(&self) -> &'static str {
        self.label
    }

    async fn write(&self, db: &DbPool, parent_id: Uuid) -> Result<u64, DbErr> {
        let rows = (self.build)(parent_id);
        if rows.is_empty() {
            return Ok(0);
        }
        E::insert_many(rows).exec_without_returning(db).await
    }

    async fn clear(&self, db: &DbPool, parent_id: Uuid) -> Result<u64, DbErr> {
        let result = E::delete_many()
            .filter(self.parent_column.eq(parent_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}

/// Result of a completed multi-step write.
#[derive(Debug, Clone)]
pub struct WriteOutcome<M> {
    pub parent: M,
    /// Rows written per collection, in declaration order.
    pub children: Vec<(&'static str, u64)>,
}

impl<M> WriteOutcome<M> {
    pub fn rows(&self, label: &str) -> u64 {
        self.children
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

pub struct MultiStepWriter<'a> {
    db: &'a DbPool,
    children: Vec<Box<dyn ChildRows + 'a>>,
}

impl<'a> MultiStepWriter<'a> {
    pub fn new(db: &'a DbPool) -> Self {
        Self {
            db,
            children: Vec::new(),
        }
    }

    pub fn child(mut self, rows: impl ChildRows + 'a) -> Self {
        self.children.push(Box::new(rows));
        self
    }

    /// Inserts the parent, then every child collection.
    pub async fn insert<A>(
        self,
        parent: A,
    ) -> Result<WriteOutcome<<A::Entity as EntityTrait>::Model>, ServiceError>
    where
        A: ActiveModelTrait + ActiveModelBehavior + Send + 'a,
        <A::Entity as EntityTrait>::Model: IntoActiveModel<A> + Identified,
    {
        let parent = parent.insert(self.db).await?;
        let parent_id = parent.row_id();
        debug!(%parent_id, collections = self.children.len(), "parent row inserted");

        let results = join_all(
            self.children
                .iter()
                .map(|child| child.write(self.db, parent_id)),
        )
        .await;

        let children = self.collect(parent_id, results)?;
        Ok(WriteOutcome { parent, children })
    }

    /// Updates the parent, then replaces each child collection by deleting
    /// its current rows and inserting the new ones.
    pub async fn replace<A>(
        self,
        parent: A,
    ) -> Result<WriteOutcome<<A::Entity as EntityTrait>::Model>, ServiceError>
    where
        A: ActiveModelTrait + ActiveModelBehavior + Send + 'a,
        <A::Entity as EntityTrait>::Model: IntoActiveModel<A> + Identified,
    {
        let parent = parent.update(self.db).await?;
        let parent_id = parent.row_id();
        let db = self.db;

        let results = join_all(self.children.iter().map(|child| async move {
            child.clear(db, parent_id).await?;
            child.write(db, parent_id).await
        }))
        .await;

        let children = self.collect(parent_id, results)?;
        Ok(WriteOutcome { parent, children })
    }

    fn collect(
        &self,
        parent_id: Uuid,
        results: Vec<Result<u64, DbErr>>,
    ) -> Result<Vec<(&'static str, u64)>, ServiceError> {
        let mut written = Vec::with_capacity(results.len());
        let mut first_error: Option<(&'static str, DbErr)> = None;

        for (child, result) in self.children.iter().zip(results) {
            match result {
                Ok(rows) => written.push((child.label(), rows)),
                Err(err) => {
                    if first_error.is_none() {
                        first_error = Some((child.label(), err));
                    }
                }
            }
        }

        match first_error {
            None => Ok(written),
            Some((label, err)) => {
                warn!(%parent_id, collection = label, error = %err, "multi-step write left partial rows");
                Err(ServiceError::PartialWrite {
                    parent_id,
                    written: written.iter().map(|(l, _)| l.to_string()).collect(),
                    reason: format!("{}: {}", label, err),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{connect, run_migrations, DbConfig};
    use crate::entities::{tco, tco_indirect_cost, tco_operational_cost};
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;
    use sea_orm::{EntityTrait, PaginatorTrait, Set};
    use tempfile::TempDir;

    struct FailingRows;

    #[async_trait]
    impl ChildRows for FailingRows {
        fn label(&self) -> &'static str {
            "failing"
        }

        async fn write(&self, _db: &DbPool, _parent_id: Uuid) -> Result<u64, DbErr> {
            Err(DbErr::Custom("simulated failure".into()))
        }
    }

    async fn test_db() -> (TempDir, DbPool) {
        let dir = TempDir::new().unwrap();
        let db = connect(&DbConfig::sqlite_file(&dir.path().join("writer.db")))
            .await
            .unwrap();
        run_migrations(&db).await.unwrap();
        (dir, db)
    }

    fn parent() -> tco::ActiveModel {
        tco::ActiveModel {
            id: Set(Uuid::new_v4()),
            model: Set("M404".into()),
            manufacturer: Set("HP".into()),
            kind: Set("Laser".into()),
            device_price: Set(dec!(1000)),
            pis: Set(dec!(0)),
            ipi: Set(dec!(0)),
            icms: Set(dec!(0)),
            cofins: Set(dec!(0)),
            accessories: Set(dec!(0)),
            notes: Set(None),
            acquisition_total: Set(dec!(1000)),
            ..Default::default()
        }
    }

    fn operational(labels: &'static [&'static str]) -> impl ChildRows {
        RowBatch::<tco_operational_cost::Entity, _>::new(
            "operational_costs",
            tco_operational_cost::Column::TcoId,
            move |tco_id| {
                labels
                    .iter()
                    .map(|label| tco_operational_cost::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        tco_id: Set(tco_id),
                        label: Set(label.to_string()),
                        value: Set(dec!(10)),
                    })
                    .collect()
            },
        )
    }

    #[tokio::test]
    async fn writes_parent_then_children() {
        let (_dir, db) = test_db().await;

        let outcome = MultiStepWriter::new(&db)
            .child(operational(&["paper", "toner"]))
            .insert(parent())
            .await
            .unwrap();

        assert_eq!(outcome.rows("operational_costs"), 2);
        let stored = tco_operational_cost::Entity::find().count(&db).await.unwrap();
        assert_eq!(stored, 2);
    }

    #[tokio::test]
    async fn failed_child_keeps_parent_and_earlier_rows() {
        let (_dir, db) = test_db().await;

        let err = MultiStepWriter::new(&db)
            .child(operational(&["paper"]))
            .child(FailingRows)
            .insert(parent())
            .await
            .unwrap_err();

        assert_matches!(
            err,
            ServiceError::PartialWrite { ref written, ref reason, .. }
                if written == &vec!["operational_costs".to_string()] && reason.contains("simulated failure")
        );
        assert_eq!(tco::Entity::find().count(&db).await.unwrap(), 1);
        assert_eq!(
            tco_operational_cost::Entity::find().count(&db).await.unwrap(),
            1
        );
        assert_eq!(tco_indirect_cost::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn resubmitting_after_a_partial_write_duplicates_the_parent() {
        let (_dir, db) = test_db().await;

        let first = MultiStepWriter::new(&db)
            .child(FailingRows)
            .insert(parent())
            .await;
        assert!(first.is_err());

        MultiStepWriter::new(&db)
            .child(operational(&["paper"]))
            .insert(parent())
            .await
            .unwrap();

        assert_eq!(tco::Entity::find().count(&db).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn replace_swaps_child_rows() {
        let (_dir, db) = test_db().await;

        let outcome = MultiStepWriter::new(&db)
            .child(operational(&["paper", "toner", "drum"]))
            .insert(parent())
            .await
            .unwrap();

        let mut active: tco::ActiveModel = outcome.parent.into();
        active.model = Set("M404dn".into());
        let replaced = MultiStepWriter::new(&db)
            .child(operational(&["paper"]))
            .replace(active)
            .await
            .unwrap();

        assert_eq!(replaced.parent.model, "M404dn");
        assert_eq!(
            tco_operational_cost::Entity::find().count(&db).await.unwrap(),
            1
        );
    }
}
