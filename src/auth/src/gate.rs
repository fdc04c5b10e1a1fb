//! Which screen a path shows for the current session.

use types::{resource::ResourceKind, user::UserRole};

use crate::AuthState;

const ADMIN_ONLY: &[UserRole] = &[UserRole::Admin];
const FARMER_ONLY: &[UserRole] = &[UserRole::Farmer];
const ANY_ROLE: &[UserRole] = &[UserRole::Admin, UserRole::Farmer];

/// Bound on redirect chains followed by [`settle`].
const MAX_REDIRECTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    /// Sends every user on to their role home.
    Dashboard,
    FarmerDashboard,
    AdminDashboard,
    Admin(ResourceKind),
    /// Placeholder page pointing at the backend's own admin site.
    DjangoAdmin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    /// Only reachable while logged out.
    PublicOnly,
    Roles(&'static [UserRole]),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_owned(),
            Route::Login => "/login".to_owned(),
            Route::Register => "/register".to_owned(),
            Route::Dashboard => "/dashboard".to_owned(),
            Route::FarmerDashboard => UserRole::Farmer.home().to_owned(),
            Route::AdminDashboard => UserRole::Admin.home().to_owned(),
            Route::Admin(kind) => kind.admin_path(),
            Route::DjangoAdmin => "/admin/django-admin".to_owned(),
        }
    }

    fn access(&self) -> Access {
        match self {
            Route::Home | Route::Login | Route::Register => Access::PublicOnly,
            Route::Dashboard => Access::Roles(ANY_ROLE),
            Route::FarmerDashboard => Access::Roles(FARMER_ONLY),
            Route::AdminDashboard | Route::Admin(_) | Route::DjangoAdmin => {
                Access::Roles(ADMIN_ONLY)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    /// Session still resolving; show a placeholder.
    Loading,
    Redirect(String),
    NotFound,
}

enum Matched {
    Route(Route),
    /// `/admin/<something unknown>`: still admin-only, then not found.
    UnknownAdmin,
    Unknown,
}

fn match_path(path: &str) -> Matched {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [] => Matched::Route(Route::Home),
        ["login"] => Matched::Route(Route::Login),
        ["register"] => Matched::Route(Route::Register),
        ["dashboard"] => Matched::Route(Route::Dashboard),
        ["farmer"] => Matched::Route(Route::FarmerDashboard),
        ["admin"] => Matched::Route(Route::AdminDashboard),
        ["admin", "django-admin"] => Matched::Route(Route::DjangoAdmin),
        ["admin", slug] => match ResourceKind::from_slug(slug) {
            Some(kind) => Matched::Route(Route::Admin(kind)),
            None => Matched::UnknownAdmin,
        },
        ["admin", ..] => Matched::UnknownAdmin,
        _ => Matched::Unknown,
    }
}

fn gate(access: Access, auth: &AuthState) -> Option<Navigation> {
    match (access, auth) {
        (_, AuthState::Loading) => Some(Navigation::Loading),
        (Access::PublicOnly, AuthState::Anonymous) => None,
        (Access::PublicOnly, AuthState::Authenticated(_)) => {
            Some(Navigation::Redirect(Route::Dashboard.path()))
        }
        (Access::Roles(_), AuthState::Anonymous) => {
            Some(Navigation::Redirect(Route::Login.path()))
        }
        (Access::Roles(roles), AuthState::Authenticated(user)) => {
            if roles.contains(&user.role) {
                None
            } else {
                Some(Navigation::Redirect(user.role.home().to_owned()))
            }
        }
    }
}

/// One navigation step for `path`.
pub fn resolve(path: &str, auth: &AuthState) -> Navigation {
    match match_path(path) {
        Matched::Unknown => Navigation::NotFound,
        Matched::UnknownAdmin => {
            gate(Access::Roles(ADMIN_ONLY), auth).unwrap_or(Navigation::NotFound)
        }
        Matched::Route(route) => {
            if let Some(navigation) = gate(route.access(), auth) {
                return navigation;
            }
            match (route, auth.role()) {
                (Route::Dashboard, Some(role)) => Navigation::Redirect(role.home().to_owned()),
                _ => Navigation::Render(route),
            }
        }
    }
}

/// Follows redirects from `path` and returns where the user ends up.
pub fn settle(path: &str, auth: &AuthState) -> (String, Navigation) {
    let mut path = path.to_owned();
    for _ in 0..MAX_REDIRECTS {
        match resolve(&path, auth) {
            Navigation::Redirect(next) => path = next,
            navigation => return (path, navigation),
        }
    }
    let navigation = resolve(&path, auth);
    (path, navigation)
}

#[cfg(test)]
mod tests {
    use types::user::User;

    use super::*;

    fn signed_in(role: UserRole) -> AuthState {
        AuthState::Authenticated(User {
            id: 1,
            username: "someone".to_owned(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            role,
            is_active: true,
        })
    }

    fn redirect(path: &str) -> Navigation {
        Navigation::Redirect(path.to_owned())
    }

    #[test]
    fn anonymous_is_sent_to_login() {
        let auth = AuthState::Anonymous;
        assert_eq!(resolve("/admin/users", &auth), redirect("/login"));
        assert_eq!(resolve("/farmer", &auth), redirect("/login"));
        assert_eq!(resolve("/dashboard", &auth), redirect("/login"));
        assert_eq!(resolve("/admin/nope", &auth), redirect("/login"));
        assert_eq!(resolve("/login", &auth), Navigation::Render(Route::Login));
        assert_eq!(resolve("/", &auth), Navigation::Render(Route::Home));
    }

    #[test]
    fn wrong_role_goes_home() {
        let farmer = signed_in(UserRole::Farmer);
        assert_eq!(resolve("/admin", &farmer), redirect("/farmer"));
        assert_eq!(resolve("/admin/devices/", &farmer), redirect("/farmer"));
        assert_eq!(resolve("/farmer", &farmer), Navigation::Render(Route::FarmerDashboard));

        let admin = signed_in(UserRole::Admin);
        assert_eq!(resolve("/farmer", &admin), redirect("/admin"));
        assert_eq!(
            resolve("/admin/breed-types?page=2", &admin),
            Navigation::Render(Route::Admin(ResourceKind::BreedTypes))
        );
    }

    #[test]
    fn signed_in_users_skip_public_screens() {
        let admin = signed_in(UserRole::Admin);
        assert_eq!(resolve("/login", &admin), redirect("/dashboard"));
        assert_eq!(resolve("/dashboard", &admin), redirect("/admin"));
        assert_eq!(
            settle("/register", &signed_in(UserRole::Farmer)),
            ("/farmer".to_owned(), Navigation::Render(Route::FarmerDashboard))
        );
    }

    #[test]
    fn loading_and_unknown() {
        assert_eq!(resolve("/admin/users", &AuthState::Loading), Navigation::Loading);
        assert_eq!(resolve("/login", &AuthState::Loading), Navigation::Loading);
        assert_eq!(resolve("/nowhere", &AuthState::Anonymous), Navigation::NotFound);
        assert_eq!(
            resolve("/admin/nope", &signed_in(UserRole::Admin)),
            Navigation::NotFound
        );
        assert_eq!(
            settle("/admin/users", &AuthState::Anonymous),
            ("/login".to_owned(), Navigation::Render(Route::Login))
        );
    }

    #[test]
    fn django_admin_is_admin_only() {
        assert_eq!(
            resolve("/admin/django-admin", &signed_in(UserRole::Admin)),
            Navigation::Render(Route::DjangoAdmin)
        );
        assert_eq!(
            resolve("/admin/django-admin", &signed_in(UserRole::Farmer)),
            redirect("/farmer")
        );
    }

    #[test]
    fn admin_paths_round_trip() {
        for kind in ResourceKind::ALL {
            let route = Route::Admin(kind);
            assert_eq!(
                resolve(&route.path(), &signed_in(UserRole::Admin)),
                Navigation::Render(route)
            );
        }
    }
}
