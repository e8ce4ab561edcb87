use chrono::{DateTime, Utc};
use diesel::Insertable;
use serde::{Deserialize, Serialize};

use crate::schema::groups as GroupsTable;
use crate::schema::sales as SalesTable;
use crate::schema::user_groups as UserGroupsTable;
use crate::schema::users as UsersTable;

#[derive(Serialize, Deserialize, Insertable, Debug, Clone)]
#[diesel(table_name = UsersTable)]
pub struct CreateUser {
    pub name: String,
    pub role: String,
}

#[derive(Serialize, Deserialize, Insertable, Debug, Clone)]
#[diesel(table_name = GroupsTable)]
pub struct CreateGroup {
    pub name: String,
}

#[derive(Serialize, Deserialize, Insertable, Debug, Clone, Copy, PartialEq, Eq)]
#[diesel(table_name = UserGroupsTable)]
pub struct CreateMembership {
    pub user_id: i32,
    pub group_id: i32,
}

#[derive(Serialize, Deserialize, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = SalesTable)]
pub struct CreateSale {
    pub user_id: i32,
    pub amount: i64,
    pub sold_at: DateTime<Utc>,
}

/// Row counts written by one seeding run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub groups: usize,
    pub memberships: usize,
    pub sales: usize,
}
