pub mod consts;
pub mod engine;
pub mod model;
pub mod xdm;

pub use engine::functions::ids::{IdFunction, IdFunctions};
pub use engine::ids::{Direction, IdResolver, IdSequence, Strategy, TokenSet, is_id_attribute};
pub use engine::location::Location;
pub use engine::runtime::{Error, ErrorCode, ResolverOptions, ResolverOptionsBuilder, StrategyPreference};
pub use model::simple::{SimpleDocument, SimpleNode, SimpleNodeBuilder, attr, comment, doc, elem, text};
pub use model::{DocumentKey, IndexKind, IndexRequest, IndexedDocument, NodeKind, QName, ValueIndex, XdmNode};
pub use xdm::{XdmAtomicValue, XdmItem, XdmSequence};
