/// Error returned by the functions deriving type definitions or resolvers from a context.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The microservice error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rewriting the federation SDL failed
    #[error(transparent)]
    Stitching(#[from] stitching_directives::Error),
    #[error("parsing stitched SDL: {0}")]
    Parse(#[from] async_graphql_parser::Error),
    #[error("type `{0}` is extended but never defined")]
    ExtensionWithoutBase(String),
    #[error("type `{0}` is defined more than once")]
    DuplicateType(String),
    #[error("unknown type `{name}` referenced by `{location}`")]
    UnknownType { name: String, location: String },
    #[error("unknown directive `@{name}` on `{location}`")]
    UnknownDirective { name: String, location: String },
    #[error("directive `@{name}` is not allowed on `{location}`")]
    MisplacedDirective { name: String, location: String },
    #[error("directive `@{name}` is used more than once on `{location}`")]
    RepeatedDirective { name: String, location: String },
    #[error("directive `@{name}` on `{location}` has no argument `{argument}`")]
    UnknownDirectiveArgument {
        name: String,
        argument: String,
        location: String,
    },
    #[error("directive `@{name}` on `{location}` is missing the required argument `{argument}`")]
    MissingDirectiveArgument {
        name: String,
        argument: String,
        location: String,
    },
    #[error("query root type `{0}` is not defined")]
    MissingQueryType(String),
    /// A resolver targets a type or field the schema does not declare
    #[error("{0} defined in resolvers, but not in schema")]
    MissingResolverTarget(String),
    /// Validation error raised by the execution engine, unmodified
    #[error("{0}")]
    InvalidSchema(String),
    /// The function deriving type definitions or resolvers failed
    #[error("deriving schema inputs: {0}")]
    Derive(#[source] BoxError),
    /// Route paths must start with `/`
    #[error("`{0}` is not a valid route path, it must start with `/`")]
    InvalidPath(String),
    #[error("the service must be started before it is applied to a router")]
    NotStarted,
    /// Cannot start the HTTP server
    #[error("starting server: {0}")]
    Server(#[source] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
