use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Icon::Table)
                    .if_not_exists()
                    .col(pk_auto(Icon::Id))
                    .col(string_len(Icon::Label, 50).not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        // Seed the trip category catalog
        let insert = Query::insert()
            .into_table(Icon::Table)
            .columns([Icon::Label])
            .values_panic(["comfort".into()])
            .values_panic(["eco".into()])
            .values_panic(["express".into()])
            .values_panic(["family".into()])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Icon::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Icon {
    Table,
    Id,
    Label,
}
