//! Per-session navigation allow-list.
//!
//! Menu access is stored as flat permission ids of the form
//! `menu_<path with '/' replaced by '_'>`. The gate for a session is
//! resolved once at sign-in and carried on the [`Session`](super::session::Session)
//! until it ends.

use std::collections::BTreeSet;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    db::DbPool,
    entities::{app_user, user_permission},
    errors::ServiceError,
};

pub const PERMISSION_PREFIX: &str = "menu_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub path: &'static str,
    pub label: &'static str,
    pub category: &'static str,
}

pub const DASHBOARD: MenuEntry = MenuEntry {
    path: "/",
    label: "Dashboard",
    category: "Dashboard",
};

const fn entry(category: &'static str, path: &'static str, label: &'static str) -> MenuEntry {
    MenuEntry {
        path,
        label,
        category,
    }
}

/// Route paths of the gated menu entries.
pub mod paths {
    pub const TONERS: &str = "/cadastro-toners";
    pub const UNITS: &str = "/cadastro-unidades";
    pub const AUDIT_FORMS: &str = "/cadastro-formularios-auditoria";
    pub const WARRANTIES: &str = "/registro-garantias";
    pub const TCO: &str = "/tco";
    pub const RETURNS: &str = "/registro-retornados";
    pub const NC: &str = "/registro-nc";
    pub const AUDITS: &str = "/registro-auditoria";
    pub const QUERY_WARRANTIES: &str = "/consulta-garantias";
    pub const QUERY_RETURNS: &str = "/consulta-retornados";
    pub const QUERY_TONERS: &str = "/consulta-toners";
    pub const QUERY_UNITS: &str = "/consulta-unidades";
    pub const QUERY_TCO: &str = "/consulta-tco";
    pub const QUERY_NC: &str = "/consulta-nc";
    pub const QUERY_AUDITS: &str = "/consulta-auditorias";
    pub const CHARTS: &str = "/graficos";
}

/// Every gated entry, in display order.
pub const MENU: &[MenuEntry] = &[
    entry("Cadastros", paths::TONERS, "Cadastro de Toners"),
    entry("Cadastros", paths::UNITS, "Cadastro de Unidades"),
    entry(
        "Cadastros",
        paths::AUDIT_FORMS,
        "Cadastro de Formulários de Auditoria",
    ),
    entry("Registros - Qualidade", paths::WARRANTIES, "Registro de Garantias"),
    entry("Registros - Qualidade", paths::TCO, "Registro de TCO"),
    entry("Registros - Qualidade", paths::RETURNS, "Registro de Retornados"),
    entry("Registros - Qualidade", paths::NC, "Registro de NC"),
    entry("Registros - Auditoria", paths::AUDITS, "Registro de Auditoria"),
    entry("Consultas", paths::QUERY_WARRANTIES, "Consulta de Garantias"),
    entry("Consultas", paths::QUERY_RETURNS, "Consulta de Retornados"),
    entry("Consultas", paths::QUERY_TONERS, "Consulta de Toners"),
    entry("Consultas", paths::QUERY_UNITS, "Consulta de Unidades"),
    entry("Consultas", paths::QUERY_TCO, "Consulta de TCO"),
    entry("Consultas", paths::QUERY_NC, "Consulta de NC"),
    entry("Consultas", paths::QUERY_AUDITS, "Consulta de Auditorias"),
    entry("Gráficos", paths::CHARTS, "Análise de Dados"),
];

/// Encodes a route path as a permission id: `/tco` becomes `menu__tco`.
pub fn permission_id(path: &str) -> String {
    format!("{}{}", PERMISSION_PREFIX, path.replace('/', "_"))
}

/// Decodes a permission id back into its route path.
///
/// Returns `None` for ids that do not carry the menu prefix.
pub fn path_from_permission(id: &str) -> Option<String> {
    id.strip_prefix(PERMISSION_PREFIX)
        .map(|encoded| encoded.replace('_', "/"))
}

/// Looks up a catalog entry by path.
pub fn find_entry(path: &str) -> Option<&'static MenuEntry> {
    MENU.iter().find(|entry| entry.path == path)
}

/// Navigation gate for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "paths", rename_all = "snake_case")]
pub enum GateState {
    #[default]
    Uninitialized,
    Loading,
    /// No permissions: dashboard only.
    None,
    Admin,
    /// Dashboard plus the decoded allow-listed paths.
    Scoped(BTreeSet<String>),
}

/// What a permission lookup found for a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Admin,
    Permissions(Vec<String>),
}

impl GateState {
    pub fn begin_loading(&mut self) {
        if matches!(self, Self::Uninitialized) {
            *self = Self::Loading;
        }
    }

    /// Settles a loading gate. A failed lookup fails closed to `None`.
    pub fn finish<E: std::fmt::Display>(&mut self, lookup: Result<Access, E>) {
        if !matches!(self, Self::Loading) {
            warn!(state = ?self, "ignoring gate resolution outside of loading");
            return;
        }

        *self = match lookup {
            Ok(Access::Admin) => Self::Admin,
            Ok(Access::Permissions(ids)) => {
                let paths: BTreeSet<String> = ids
                    .iter()
                    .filter_map(|id| path_from_permission(id))
                    .filter(|path| path != DASHBOARD.path)
                    .collect();
                if paths.is_empty() {
                    Self::None
                } else {
                    Self::Scoped(paths)
                }
            }
            Err(e) => {
                warn!(error = %e, "permission lookup failed, showing dashboard only");
                Self::None
            }
        };
    }

    /// Runs the full `Uninitialized -> Loading -> resolved` sequence.
    pub fn resolved<E: std::fmt::Display>(lookup: Result<Access, E>) -> Self {
        let mut gate = Self::default();
        gate.begin_loading();
        gate.finish(lookup);
        gate
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Uninitialized | Self::Loading)
    }

    pub fn allows(&self, path: &str) -> bool {
        if path == DASHBOARD.path {
            return true;
        }
        match self {
            Self::Admin => true,
            Self::Scoped(paths) => paths.contains(path),
            Self::Uninitialized | Self::Loading | Self::None => false,
        }
    }

    /// Dashboard first, then every catalog entry the gate allows.
    pub fn visible_entries(&self) -> Vec<MenuEntry> {
        std::iter::once(DASHBOARD)
            .chain(MENU.iter().copied().filter(|entry| self.allows(entry.path)))
            .collect()
    }

    /// Visible entries grouped by category, keeping catalog order.
    pub fn menu(&self) -> Vec<MenuCategory> {
        let mut categories: Vec<MenuCategory> = Vec::new();
        for entry in self.visible_entries() {
            match categories.last_mut() {
                Some(last) if last.name == entry.category => last.entries.push(entry),
                _ => categories.push(MenuCategory {
                    name: entry.category,
                    entries: vec![entry],
                }),
            }
        }
        categories
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuCategory {
    pub name: &'static str,
    pub entries: Vec<MenuEntry>,
}

/// Fetches what the gate needs to know about `user`.
pub async fn lookup_access(db: &DbPool, user: &app_user::Model) -> Result<Access, ServiceError> {
    if user.is_admin {
        return Ok(Access::Admin);
    }

    let ids = user_permission::Entity::find()
        .filter(user_permission::Column::UserId.eq(user.id))
        .all(db)
        .await?
        .into_iter()
        .map(|row| row.permission_id)
        .collect::<Vec<_>>();

    debug!(user_id = %user.id, permissions = ids.len(), "menu permissions loaded");
    Ok(Access::Permissions(ids))
}

/// Resolves the gate for a freshly signed-in user.
pub async fn resolve_gate(db: &DbPool, user: &app_user::Model) -> GateState {
    GateState::resolved(lookup_access(db, user).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(gate: &GateState) -> Vec<&'static str> {
        gate.visible_entries().iter().map(|e| e.path).collect()
    }

    #[test]
    fn permission_ids_round_trip_through_paths() {
        assert_eq!(permission_id("/cadastro-toners"), "menu__cadastro-toners");
        assert_eq!(
            path_from_permission("menu__cadastro-toners").as_deref(),
            Some("/cadastro-toners")
        );
        assert_eq!(path_from_permission("other__tco"), None);
    }

    #[test]
    fn no_permissions_shows_dashboard_only() {
        let gate = GateState::resolved::<ServiceError>(Ok(Access::Permissions(vec![])));
        assert_eq!(gate, GateState::None);
        assert_eq!(paths(&gate), vec!["/"]);
    }

    #[test]
    fn admin_sees_every_entry() {
        let gate = GateState::resolved::<ServiceError>(Ok(Access::Admin));
        assert_eq!(gate.visible_entries().len(), MENU.len() + 1);
    }

    #[test]
    fn allow_list_adds_only_listed_entries() {
        let gate = GateState::resolved::<ServiceError>(Ok(Access::Permissions(vec![
            permission_id("/cadastro-toners"),
        ])));
        assert_eq!(paths(&gate), vec!["/", "/cadastro-toners"]);
        assert!(!gate.allows("/tco"));
    }

    #[test]
    fn dashboard_permission_alone_is_dashboard_only() {
        let gate =
            GateState::resolved::<ServiceError>(Ok(Access::Permissions(vec!["menu__".into()])));
        assert_eq!(gate, GateState::None);
    }

    #[test]
    fn lookup_failure_fails_closed() {
        let gate = GateState::resolved(Err(ServiceError::InternalError("down".into())));
        assert_eq!(gate, GateState::None);
    }

    #[test]
    fn unresolved_gate_shows_dashboard_only() {
        let mut gate = GateState::default();
        assert_eq!(paths(&gate), vec!["/"]);
        gate.begin_loading();
        assert_eq!(gate, GateState::Loading);
        assert!(!gate.is_resolved());
        assert_eq!(paths(&gate), vec!["/"]);
    }

    #[test]
    fn resolved_gate_ignores_second_resolution() {
        let mut gate = GateState::resolved::<ServiceError>(Ok(Access::Admin));
        gate.finish::<ServiceError>(Ok(Access::Permissions(vec![])));
        assert_eq!(gate, GateState::Admin);
    }

    #[test]
    fn menu_groups_by_category() {
        let gate = GateState::resolved::<ServiceError>(Ok(Access::Permissions(vec![
            permission_id("/consulta-toners"),
            permission_id("/consulta-tco"),
            permission_id("/graficos"),
        ])));
        let menu = gate.menu();
        let names: Vec<_> = menu.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Dashboard", "Consultas", "Gráficos"]);
        assert_eq!(menu[1].entries.len(), 2);
    }
}
