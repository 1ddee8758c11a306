// ── Entity catalog ──
//
// Static description of every business entity the backend exposes:
// its REST resource, how its list view reconciles after edits, how its
// full list is reached, which writes it accepts, and where its form's
// foreign-key choices come from.

use gestor_api::{Capabilities, ListAllMode};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::store::ReconcileStrategy;

/// A business entity backed by one REST resource.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Entity {
    Role,
    Category,
    Customer,
    PaymentMethod,
    Supplier,
    Employee,
    Product,
    Promotion,
    Sale,
    Payment,
    Purchase,
    Stock,
    StockMovement,
    SalesReport,
    StockReport,
}

/// Where a dependency slot's records come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencySource {
    /// Another collection's memoised full list.
    Collection(Entity),
    /// `GET /X/?k=v…` on another entity's resource.
    Filtered(Entity, &'static [(&'static str, &'static str)]),
}

impl DependencySource {
    pub fn entity(self) -> Entity {
        match self {
            Self::Collection(entity) | Self::Filtered(entity, _) => entity,
        }
    }
}

/// One named foreign-key choice set on an entity's form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    pub source: DependencySource,
}

impl Dependency {
    /// Slot name: the source entity's resource.
    pub fn slot(self) -> &'static str {
        self.source.entity().resource()
    }
}

const ACTIVE: &[(&str, &str)] = &[("ativo", "true")];
const PENDING: &[(&str, &str)] = &[("status", "P")];

const fn active(entity: Entity) -> Dependency {
    Dependency {
        source: DependencySource::Filtered(entity, ACTIVE),
    }
}

const fn full(entity: Entity) -> Dependency {
    Dependency {
        source: DependencySource::Collection(entity),
    }
}

impl Entity {
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    /// REST resource path segment.
    pub fn resource(self) -> &'static str {
        match self {
            Self::Role => "cargos",
            Self::Category => "categorias",
            Self::Customer => "clientes",
            Self::PaymentMethod => "formas-pagamento",
            Self::Supplier => "fornecedores",
            Self::Employee => "funcionarios",
            Self::Product => "produtos",
            Self::Promotion => "promocoes",
            Self::Sale => "vendas",
            Self::Payment => "pagamentos",
            Self::Purchase => "compras",
            Self::Stock => "estoques",
            Self::StockMovement => "movimentacoes-estoque",
            Self::SalesReport => "relatorios-vendas",
            Self::StockReport => "relatorios-estoque",
        }
    }

    pub fn default_ordering(self) -> Option<&'static str> {
        match self {
            Self::Product => Some("-id"),
            _ => None,
        }
    }

    /// Role, category and supplier rows are patched in place after an
    /// edit; every other list is re-fetched.
    pub fn reconcile(self) -> ReconcileStrategy {
        match self {
            Self::Role | Self::Category | Self::Supplier => ReconcileStrategy::Patch,
            _ => ReconcileStrategy::Refetch,
        }
    }

    pub fn list_all_mode(self) -> ListAllMode {
        match self {
            Self::Supplier | Self::Employee | Self::Product => ListAllMode::Dedicated,
            _ => ListAllMode::Unpaged,
        }
    }

    pub fn capabilities(self) -> Capabilities {
        match self {
            Self::Stock => Capabilities::UPDATE_ONLY,
            Self::StockMovement | Self::SalesReport | Self::StockReport => {
                Capabilities::APPEND_ONLY
            }
            _ => Capabilities::CRUD,
        }
    }

    /// Foreign-key choice sets the entity's form needs.
    pub fn dependencies(self) -> &'static [Dependency] {
        match self {
            Self::Employee => EMPLOYEE_DEPS,
            Self::Product => PRODUCT_DEPS,
            Self::Promotion => PROMOTION_DEPS,
            Self::Sale => SALE_DEPS,
            Self::Payment => PAYMENT_DEPS,
            Self::Purchase => PURCHASE_DEPS,
            Self::Stock => STOCK_DEPS,
            Self::SalesReport => SALES_REPORT_DEPS,
            _ => &[],
        }
    }
}

const EMPLOYEE_DEPS: &[Dependency] = &[active(Entity::Role)];
const PRODUCT_DEPS: &[Dependency] = &[full(Entity::Category), full(Entity::Supplier)];
const PROMOTION_DEPS: &[Dependency] = &[active(Entity::Product)];
const SALE_DEPS: &[Dependency] = &[active(Entity::Employee), active(Entity::Product)];
const PAYMENT_DEPS: &[Dependency] = &[
    active(Entity::PaymentMethod),
    Dependency {
        source: DependencySource::Filtered(Entity::Sale, PENDING),
    },
];
const PURCHASE_DEPS: &[Dependency] = &[
    full(Entity::Supplier),
    full(Entity::Employee),
    full(Entity::Product),
];
const STOCK_DEPS: &[Dependency] = &[active(Entity::Product), active(Entity::Employee)];
const SALES_REPORT_DEPS: &[Dependency] = &[active(Entity::Employee)];

/// Report lists that are generated server-side on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ReportKind {
    Sales,
    Stock,
}

impl From<ReportKind> for Entity {
    fn from(kind: ReportKind) -> Self {
        match kind {
            ReportKind::Sales => Self::SalesReport,
            ReportKind::Stock => Self::StockReport,
        }
    }
}
