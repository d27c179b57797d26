use sea_query::Iden;

#[derive(Iden, Clone)]
pub enum Account {
    Table,
    Id,
    Email,
    Password,
    Role,
    FullName,
    Address,
    EmployeeId,
    CreatedAt,
}

#[derive(Iden, Clone)]
pub enum Session {
    Table,
    Id,
    AccountId,
    Role,
    UserAgent,
    CreatedAt,
    ExpireAt,
}

#[derive(Iden, Clone)]
pub enum Subscription {
    Table,
    AccountId,
    BarrelsRemaining,
    ExpireAt,
    Status,
    UpdatedAt,
}

#[derive(Iden, Clone)]
pub enum CylinderOrder {
    Table,
    Id,
    OrderNumber,
    AccountId,
    CylinderType,
    DeliveryDate,
    DeliverySlot,
    Address,
    Payment,
    Total,
    Status,
    Refunded,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden, Clone)]
pub enum Inventory {
    Table,
    Sku,
    Count,
    UpdatedAt,
}

#[derive(Iden, Clone)]
pub enum FeedItem {
    Table,
    Id,
    Kind,
    Title,
    Description,
    CreatedAt,
}
