//! Accounts and the farms they own.

use managers::{form::numeric, Column, Field, ResourceSpec};
use types::{
    farm::Farm,
    resource::ResourceKind,
    user::{Farmer, User},
};

pub fn users() -> ResourceSpec<User> {
    let kind = ResourceKind::Users;
    ResourceSpec::new(kind.title(), kind.endpoint())
        .item(kind.item())
        .columns(vec![
            Column::new("username", "Username"),
            Column::new("name", "Name").render(|u: &User| u.full_name()),
            Column::new("email", "Email"),
            Column::new("role", "Role"),
            Column::new("is_active", "Active").render(|u: &User| yes_no(u.is_active)),
        ])
        .fields(vec![
            Field::text("username", "Username").required(),
            Field::text("email", "Email").required(),
            Field::text("first_name", "First Name"),
            Field::text("last_name", "Last Name"),
            Field::select("role", "Role", &[("farmer", "Farmer"), ("admin", "Admin")]),
            Field::checkbox("is_active", "Active"),
        ])
}

fn yes_no(flag: bool) -> String {
    String::from(if flag { "Yes" } else { "No" })
}

pub fn farmers() -> ResourceSpec<Farmer> {
    let kind = ResourceKind::Farmers;
    ResourceSpec::new(kind.title(), kind.endpoint())
        .item(kind.item())
        .columns(vec![
            Column::new("user", "Name").render(|f: &Farmer| f.user.label()),
            Column::new("email", "Email").render(|f: &Farmer| {
                f.user.expanded().map(|u| u.email.clone()).unwrap_or_default()
            }),
            Column::new("phone_number", "Phone"),
            Column::new("address", "Address"),
        ])
        .fields(vec![
            Field::text("user", "User ID").required(),
            Field::text("phone_number", "Phone Number"),
            Field::textarea("address", "Address"),
        ])
        .normalize_in(numeric(&["user"], &[]))
}

pub fn farms() -> ResourceSpec<Farm> {
    let kind = ResourceKind::Farms;
    ResourceSpec::new(kind.title(), kind.endpoint())
        .item(kind.item())
        .columns(vec![
            Column::new("name", "Name"),
            Column::new("farmer", "Farmer").render(|f: &Farm| f.farmer.label()),
            Column::new("location", "Location"),
            Column::new("size", "Size"),
        ])
        .fields(vec![
            Field::text("name", "Name").required(),
            Field::text("farmer", "Farmer ID").required(),
            Field::text("location", "Location"),
            Field::text("size", "Size").placeholder("Acres"),
        ])
        .normalize_in(numeric(&["farmer", "size"], &[]))
}
