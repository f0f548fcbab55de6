//! Renders a parsed type system document back to SDL.

use std::fmt::{self, Display, Write};

use async_graphql_parser::{
    types::{
        BaseType, ConstDirective, DirectiveDefinition, DirectiveLocation, FieldDefinition, InputValueDefinition,
        SchemaDefinition, ServiceDocument, Type, TypeDefinition, TypeKind, TypeSystemDefinition,
    },
    Positioned,
};
use async_graphql_value::ConstValue;

const INDENT: &str = "    ";

/// Render a type system document as SDL. Definitions keep their order and are separated by
/// an empty line.
pub fn print_document(document: &ServiceDocument) -> String {
    Renderer { document }.to_string()
}

struct Renderer<'a> {
    document: &'a ServiceDocument,
}

impl Display for Renderer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first_block = true;

        for definition in &self.document.definitions {
            if !std::mem::take(&mut first_block) {
                f.write_char('\n')?;
            }

            match definition {
                TypeSystemDefinition::Schema(schema) => write_schema_definition(f, &schema.node)?,
                TypeSystemDefinition::Type(ty) => write_type_definition(f, &ty.node)?,
                TypeSystemDefinition::Directive(directive) => write_directive_definition(f, &directive.node)?,
            }
        }

        Ok(())
    }
}

fn write_schema_definition(f: &mut fmt::Formatter<'_>, schema: &SchemaDefinition) -> fmt::Result {
    if schema.extend {
        f.write_str("extend ")?;
    }

    f.write_str("schema")?;
    write_directives(f, &schema.directives)?;

    let operations = [
        ("query", &schema.query),
        ("mutation", &schema.mutation),
        ("subscription", &schema.subscription),
    ];

    if operations.iter().any(|(_, name)| name.is_some()) {
        f.write_char(' ')?;
        write_block(f, |f| {
            for (operation, name) in operations {
                if let Some(name) = name {
                    writeln!(f, "{INDENT}{operation}: {}", name.node)?;
                }
            }

            Ok(())
        })?;
    }

    f.write_char('\n')
}

fn write_type_definition(f: &mut fmt::Formatter<'_>, definition: &TypeDefinition) -> fmt::Result {
    write_description(f, definition.description.as_ref(), "")?;

    if definition.extend {
        f.write_str("extend ")?;
    }

    let name = &definition.name.node;

    match &definition.kind {
        TypeKind::Scalar => {
            write!(f, "scalar {name}")?;
            write_directives(f, &definition.directives)?;
        }
        TypeKind::Object(object) => {
            write!(f, "type {name}")?;
            write_implements(f, &object.implements)?;
            write_directives(f, &definition.directives)?;
            write_fields(f, &object.fields)?;
        }
        TypeKind::Interface(interface) => {
            write!(f, "interface {name}")?;
            write_implements(f, &interface.implements)?;
            write_directives(f, &definition.directives)?;
            write_fields(f, &interface.fields)?;
        }
        TypeKind::Union(union) => {
            write!(f, "union {name}")?;
            write_directives(f, &definition.directives)?;

            let mut members = union.members.iter().peekable();

            if members.peek().is_some() {
                f.write_str(" = ")?;
            }

            while let Some(member) = members.next() {
                f.write_str(&member.node)?;

                if members.peek().is_some() {
                    f.write_str(" | ")?;
                }
            }
        }
        TypeKind::Enum(r#enum) => {
            write!(f, "enum {name}")?;
            write_directives(f, &definition.directives)?;

            if !r#enum.values.is_empty() {
                f.write_char(' ')?;
                write_block(f, |f| {
                    for value in &r#enum.values {
                        write_description(f, value.node.description.as_ref(), INDENT)?;
                        f.write_str(INDENT)?;
                        f.write_str(&value.node.value.node)?;
                        write_directives(f, &value.node.directives)?;
                        f.write_char('\n')?;
                    }

                    Ok(())
                })?;
            }
        }
        TypeKind::InputObject(input_object) => {
            write!(f, "input {name}")?;
            write_directives(f, &definition.directives)?;

            if !input_object.fields.is_empty() {
                f.write_char(' ')?;
                write_block(f, |f| {
                    for field in &input_object.fields {
                        write_description(f, field.node.description.as_ref(), INDENT)?;
                        f.write_str(INDENT)?;
                        write_input_value(f, &field.node)?;
                        f.write_char('\n')?;
                    }

                    Ok(())
                })?;
            }
        }
    }

    f.write_char('\n')
}

fn write_directive_definition(f: &mut fmt::Formatter<'_>, definition: &DirectiveDefinition) -> fmt::Result {
    write_description(f, definition.description.as_ref(), "")?;
    write!(f, "directive @{}", definition.name.node)?;
    write_arguments_definition(f, &definition.arguments)?;

    if definition.is_repeatable {
        f.write_str(" repeatable")?;
    }

    f.write_str(" on ")?;

    let mut locations = definition.locations.iter().peekable();

    while let Some(location) = locations.next() {
        f.write_str(directive_location(&location.node))?;

        if locations.peek().is_some() {
            f.write_str(" | ")?;
        }
    }

    f.write_char('\n')
}

fn write_implements(f: &mut fmt::Formatter<'_>, implements: &[Positioned<async_graphql_value::Name>]) -> fmt::Result {
    let mut interfaces = implements.iter().peekable();

    if interfaces.peek().is_some() {
        f.write_str(" implements ")?;
    }

    while let Some(interface) = interfaces.next() {
        f.write_str(&interface.node)?;

        if interfaces.peek().is_some() {
            f.write_str(" & ")?;
        }
    }

    Ok(())
}

fn write_fields(f: &mut fmt::Formatter<'_>, fields: &[Positioned<FieldDefinition>]) -> fmt::Result {
    if fields.is_empty() {
        return Ok(());
    }

    f.write_char(' ')?;
    write_block(f, |f| {
        for field in fields {
            let field = &field.node;

            write_description(f, field.description.as_ref(), INDENT)?;
            f.write_str(INDENT)?;
            f.write_str(&field.name.node)?;
            write_arguments_definition(f, &field.arguments)?;
            write!(f, ": {}", TypeDisplay(&field.ty.node))?;
            write_directives(f, &field.directives)?;
            f.write_char('\n')?;
        }

        Ok(())
    })
}

fn write_arguments_definition(f: &mut fmt::Formatter<'_>, arguments: &[Positioned<InputValueDefinition>]) -> fmt::Result {
    if arguments.is_empty() {
        return Ok(());
    }

    f.write_char('(')?;

    let mut arguments = arguments.iter().peekable();

    while let Some(argument) = arguments.next() {
        write_input_value(f, &argument.node)?;

        if arguments.peek().is_some() {
            f.write_str(", ")?;
        }
    }

    f.write_char(')')
}

fn write_input_value(f: &mut fmt::Formatter<'_>, input_value: &InputValueDefinition) -> fmt::Result {
    write!(f, "{}: {}", input_value.name.node, TypeDisplay(&input_value.ty.node))?;

    if let Some(default_value) = &input_value.default_value {
        write!(f, " = {}", ValueDisplay(&default_value.node))?;
    }

    write_directives(f, &input_value.directives)
}

fn write_directives(f: &mut fmt::Formatter<'_>, directives: &[Positioned<ConstDirective>]) -> fmt::Result {
    for directive in directives {
        f.write_char(' ')?;
        write_directive(f, &directive.node)?;
    }

    Ok(())
}

fn write_directive(f: &mut fmt::Formatter<'_>, directive: &ConstDirective) -> fmt::Result {
    write!(f, "@{}", directive.name.node)?;

    if directive.arguments.is_empty() {
        return Ok(());
    }

    f.write_char('(')?;

    let mut arguments = directive.arguments.iter().peekable();

    while let Some((name, value)) = arguments.next() {
        write!(f, "{}: {}", name.node, ValueDisplay(&value.node))?;

        if arguments.peek().is_some() {
            f.write_str(", ")?;
        }
    }

    f.write_char(')')
}

fn write_block(f: &mut fmt::Formatter<'_>, inner: impl FnOnce(&mut fmt::Formatter<'_>) -> fmt::Result) -> fmt::Result {
    f.write_str("{\n")?;
    inner(f)?;
    f.write_char('}')
}

fn write_description(f: &mut fmt::Formatter<'_>, description: Option<&Positioned<String>>, indent: &str) -> fmt::Result {
    let Some(description) = description else { return Ok(()) };
    Display::fmt(&Description(&description.node, indent), f)
}

fn directive_location(location: &DirectiveLocation) -> &'static str {
    match location {
        DirectiveLocation::Query => "QUERY",
        DirectiveLocation::Mutation => "MUTATION",
        DirectiveLocation::Subscription => "SUBSCRIPTION",
        DirectiveLocation::Field => "FIELD",
        DirectiveLocation::FragmentDefinition => "FRAGMENT_DEFINITION",
        DirectiveLocation::FragmentSpread => "FRAGMENT_SPREAD",
        DirectiveLocation::InlineFragment => "INLINE_FRAGMENT",
        DirectiveLocation::VariableDefinition => "VARIABLE_DEFINITION",
        DirectiveLocation::Schema => "SCHEMA",
        DirectiveLocation::Scalar => "SCALAR",
        DirectiveLocation::Object => "OBJECT",
        DirectiveLocation::FieldDefinition => "FIELD_DEFINITION",
        DirectiveLocation::ArgumentDefinition => "ARGUMENT_DEFINITION",
        DirectiveLocation::Interface => "INTERFACE",
        DirectiveLocation::Union => "UNION",
        DirectiveLocation::Enum => "ENUM",
        DirectiveLocation::EnumValue => "ENUM_VALUE",
        DirectiveLocation::InputObject => "INPUT_OBJECT",
        DirectiveLocation::InputFieldDefinition => "INPUT_FIELD_DEFINITION",
    }
}

struct Description<'a>(&'a str, &'a str);

impl Display for Description<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Description(description, indentation) = self;

        writeln!(f, r#"{indentation}""""#)?;

        let common_indent = description
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.len() - line.trim_start().len())
            .min()
            .unwrap_or(0);

        let mut lines = description
            .lines()
            .map(|line| line.get(common_indent..).unwrap_or("").trim_end())
            .skip_while(|line| line.is_empty())
            .peekable();

        while let Some(line) = lines.next() {
            let line = line.replace(r#"""""#, r#"\""""#);

            if line.is_empty() && lines.peek().map(|next| next.is_empty()).unwrap_or(true) {
                continue;
            }

            writeln!(f, "{indentation}{line}")?;
        }

        writeln!(f, r#"{indentation}""""#)
    }
}

/// Renders a type reference, e.g. `[String!]!`.
pub(crate) struct TypeDisplay<'a>(pub &'a Type);

impl Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.base {
            BaseType::Named(name) => f.write_str(name)?,
            BaseType::List(inner) => write!(f, "[{}]", TypeDisplay(inner))?,
        }

        if !self.0.nullable {
            f.write_char('!')?;
        }

        Ok(())
    }
}

struct ValueDisplay<'a>(&'a ConstValue);

impl Display for ValueDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            ConstValue::Null => f.write_str("null"),
            ConstValue::Number(number) => Display::fmt(number, f),
            ConstValue::String(s) => write_quoted(f, s),
            ConstValue::Boolean(true) => f.write_str("true"),
            ConstValue::Boolean(false) => f.write_str("false"),
            ConstValue::Binary(bytes) => write_quoted(f, &String::from_utf8_lossy(bytes)),
            ConstValue::Enum(value) => f.write_str(value),
            ConstValue::List(values) => {
                let mut values = values.iter().peekable();

                f.write_char('[')?;
                while let Some(value) = values.next() {
                    ValueDisplay(value).fmt(f)?;

                    if values.peek().is_some() {
                        f.write_str(", ")?;
                    }
                }
                f.write_char(']')
            }
            ConstValue::Object(fields) => {
                let mut fields = fields.iter().peekable();

                f.write_char('{')?;
                while let Some((key, value)) = fields.next() {
                    write!(f, "{key}: {}", ValueDisplay(value))?;

                    if fields.peek().is_some() {
                        f.write_str(", ")?;
                    }
                }
                f.write_char('}')
            }
        }
    }
}

fn write_quoted(sdl: &mut impl Write, s: &str) -> fmt::Result {
    sdl.write_char('"')?;
    for c in s.chars() {
        match c {
            '\r' => sdl.write_str("\\r"),
            '\n' => sdl.write_str("\\n"),
            '\t' => sdl.write_str("\\t"),
            '\\' => sdl.write_str("\\\\"),
            '"' => sdl.write_str("\\\""),
            c if c.is_control() => write!(sdl, "\\u{:04x}", c as u32),
            c => sdl.write_char(c),
        }?
    }
    sdl.write_char('"')
}
