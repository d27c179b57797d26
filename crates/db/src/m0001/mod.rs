mod account;
mod cylinder_order;
mod feed_item;
mod inventory;
mod session;
mod subscription;

use sqlx_migrator::vec_box;

pub struct M0001;

sqlx_migrator::sqlite_migration!(
    M0001,
    "main",
    "m0001",
    vec_box![],
    vec_box![
        account::CreateTable,
        account::CreateEmailIdx,
        session::CreateTable,
        subscription::CreateTable,
        cylinder_order::CreateTable,
        cylinder_order::CreateAccountIdx,
        cylinder_order::CreateStatusIdx,
        inventory::CreateTable,
        inventory::Seed,
        feed_item::CreateTable,
        feed_item::CreateKindIdx
    ]
);
