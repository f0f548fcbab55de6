/// Errors raised while rewriting federation SDL.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input is not a valid GraphQL type system document.
    #[error("parsing federation SDL: {0}")]
    Parse(#[from] async_graphql_parser::Error),
    /// A federation directive is missing its field set argument, or it is not a string.
    #[error("`@{directive}` on `{location}` must have a string field set argument")]
    InvalidDirectiveArgument { directive: String, location: String },
    /// A field set argument could not be parsed as a selection set.
    #[error("could not parse the field set `{fields}` of `@{directive}` on `{location}` as a selection set: {message}")]
    InvalidFieldSet {
        directive: String,
        location: String,
        fields: String,
        message: String,
    },
    /// A configured stitching directive name is not a GraphQL name.
    #[error("`{0}` is not a valid directive name")]
    InvalidDirectiveName(String),
}
