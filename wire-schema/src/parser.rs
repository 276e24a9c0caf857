//! `.proto` text to unresolved [`ProtoFile`].
//!
//! The loader talks to parsers through [`ProtoParser`]. [`DefaultParser`]
//! understands the proto2 subset the compiler generates code for: packages,
//! imports, options, messages, enums, nested declarations and `oneof`
//! members. Services and `extend` blocks are skipped. Field types are left as
//! written; the loader resolves them once every file is known.
//!
//! Comments directly above a declaration, or trailing it on the same line,
//! become its documentation.

use crate::error::{SchemaError, SchemaResult};
use crate::schema::{
    EnumConstant, EnumType, Field, Label, Location, MessageType, ProtoFile, ProtoType, ScalarType,
    Type, TypeKind,
};

/// Turns the text of one interface-definition file into declarations
pub trait ProtoParser {
    fn parse(&self, location: &Location, source: &str) -> SchemaResult<ProtoFile>;
}

/// Recursive-descent parser for the proto2 dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultParser;

impl ProtoParser for DefaultParser {
    fn parse(&self, location: &Location, source: &str) -> SchemaResult<ProtoFile> {
        let tokens = tokenize(location, source)?;
        Parser::new(location, tokens).parse_file()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Ident(String),
    Int(String),
    Float(String),
    Str(String),
    Symbol(char),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    line: u32,
    column: u32,
}

fn tokenize(location: &Location, source: &str) -> SchemaResult<Vec<Token>> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut line = 1u32;
    let mut column = 1u32;

    // Advances over `count` chars, tracking line and column.
    let advance = |pos: &mut usize, line: &mut u32, column: &mut u32, count: usize| {
        for _ in 0..count {
            if chars.get(*pos) == Some(&'\n') {
                *line += 1;
                *column = 1;
            } else {
                *column += 1;
            }
            *pos += 1;
        }
    };

    while pos < chars.len() {
        let c = chars[pos];
        let next = chars.get(pos + 1).copied();
        let (start_line, start_column) = (line, column);

        if c.is_whitespace() {
            advance(&mut pos, &mut line, &mut column, 1);
            continue;
        }

        let kind = if c == '/' && next == Some('/') {
            let start = pos + 2;
            let mut end = start;
            while end < chars.len() && chars[end] != '\n' {
                end += 1;
            }
            let text: String = chars[start..end].iter().collect();
            let count = end - pos;
            advance(&mut pos, &mut line, &mut column, count);
            TokenKind::Comment(
                text.strip_prefix(' ')
                    .unwrap_or(&text)
                    .trim_end()
                    .to_string(),
            )
        } else if c == '/' && next == Some('*') {
            let start = pos + 2;
            let mut end = start;
            while end + 1 < chars.len() && !(chars[end] == '*' && chars[end + 1] == '/') {
                end += 1;
            }
            if end + 1 >= chars.len() {
                return Err(SchemaError::syntax(
                    location.at(start_line, start_column),
                    "unterminated comment",
                ));
            }
            let text: String = chars[start..end].iter().collect();
            let count = end + 2 - pos;
            advance(&mut pos, &mut line, &mut column, count);
            TokenKind::Comment(clean_block_comment(&text))
        } else if c.is_ascii_alphabetic()
            || c == '_'
            || (c == '.' && next.is_some_and(is_ident_start))
        {
            let start = pos;
            let mut end = pos + 1;
            while end < chars.len()
                && (chars[end].is_ascii_alphanumeric() || chars[end] == '_' || chars[end] == '.')
            {
                end += 1;
            }
            let text: String = chars[start..end].iter().collect();
            advance(&mut pos, &mut line, &mut column, end - start);
            TokenKind::Ident(text)
        } else if c.is_ascii_digit() {
            let start = pos;
            let mut end = pos;
            let mut is_float = false;
            if c == '0' && matches!(next, Some('x' | 'X')) {
                end += 2;
                while end < chars.len() && chars[end].is_ascii_hexdigit() {
                    end += 1;
                }
            } else {
                while end < chars.len() {
                    let d = chars[end];
                    if d.is_ascii_digit() {
                        end += 1;
                    } else if d == '.' || d == 'e' || d == 'E' {
                        is_float = true;
                        end += 1;
                    } else if (d == '-' || d == '+') && matches!(chars[end - 1], 'e' | 'E') {
                        end += 1;
                    } else {
                        break;
                    }
                }
            }
            let text: String = chars[start..end].iter().collect();
            advance(&mut pos, &mut line, &mut column, end - start);
            if is_float {
                TokenKind::Float(text)
            } else {
                TokenKind::Int(text)
            }
        } else if c == '"' || c == '\'' {
            let quote = c;
            let mut value = String::new();
            let mut end = pos + 1;
            loop {
                let Some(&d) = chars.get(end) else {
                    return Err(SchemaError::syntax(
                        location.at(start_line, start_column),
                        "unterminated string",
                    ));
                };
                end += 1;
                if d == quote {
                    break;
                }
                if d == '\n' {
                    return Err(SchemaError::syntax(
                        location.at(start_line, start_column),
                        "unterminated string",
                    ));
                }
                if d != '\\' {
                    value.push(d);
                    continue;
                }
                let Some(&escape) = chars.get(end) else {
                    continue;
                };
                end += 1;
                match escape {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    'a' => value.push('\u{7}'),
                    'b' => value.push('\u{8}'),
                    'f' => value.push('\u{c}'),
                    'v' => value.push('\u{b}'),
                    'x' | 'X' => {
                        let digits: String = chars[end..]
                            .iter()
                            .take(2)
                            .take_while(|h| h.is_ascii_hexdigit())
                            .collect();
                        end += digits.len();
                        let code = u32::from_str_radix(&digits, 16).unwrap_or(0);
                        value.push(char::from_u32(code).unwrap_or('\u{fffd}'));
                    }
                    '0'..='7' => {
                        let digits: String = chars[end - 1..]
                            .iter()
                            .take(3)
                            .take_while(|o| ('0'..='7').contains(o))
                            .collect();
                        end += digits.len() - 1;
                        let code = u32::from_str_radix(&digits, 8).unwrap_or(0);
                        value.push(char::from_u32(code).unwrap_or('\u{fffd}'));
                    }
                    other => value.push(other),
                }
            }
            let count = end - pos;
            advance(&mut pos, &mut line, &mut column, count);
            TokenKind::Str(value)
        } else {
            advance(&mut pos, &mut line, &mut column, 1);
            TokenKind::Symbol(c)
        };

        tokens.push(Token {
            kind,
            line: start_line,
            column: start_column,
        });
    }

    Ok(tokens)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn clean_block_comment(text: &str) -> String {
    text.lines()
        .map(|line| {
            let line = line.trim();
            let line = line.strip_prefix('*').unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line).trim_end()
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

struct Parser<'a> {
    location: &'a Location,
    tokens: Vec<Token>,
    pos: usize,
    /// Line of the most recently consumed token, for trailing comments
    last_line: u32,
}

impl<'a> Parser<'a> {
    fn new(location: &'a Location, tokens: Vec<Token>) -> Self {
        Self {
            location,
            tokens,
            pos: 0,
            last_line: 0,
        }
    }

    fn parse_file(mut self) -> SchemaResult<ProtoFile> {
        let mut file = ProtoFile::new(self.location.clone());
        let mut package: Option<String> = None;

        loop {
            let documentation = self.read_documentation();
            let Some(token) = self.next() else {
                break;
            };
            let location = self.location.at(token.line, token.column);
            match token.kind {
                TokenKind::Symbol(';') => {}
                TokenKind::Ident(word) => match word.as_str() {
                    "syntax" => {
                        self.expect_symbol('=')?;
                        self.expect_string()?;
                        self.expect_symbol(';')?;
                    }
                    "package" => {
                        if package.is_some() {
                            return Err(SchemaError::syntax(location, "too many package names"));
                        }
                        package = Some(self.expect_ident()?);
                        self.expect_symbol(';')?;
                    }
                    "import" => {
                        if let Some(TokenKind::Ident(modifier)) = self.peek_kind() {
                            if modifier == "public" || modifier == "weak" {
                                self.next();
                            }
                        }
                        let path = self.expect_string()?;
                        self.expect_symbol(';')?;
                        file.imports.push(path);
                    }
                    "option" => {
                        let (name, value) = self.parse_option_statement()?;
                        file.options.add(name, value);
                    }
                    "message" => {
                        let ty = self.parse_message(
                            package.as_deref(),
                            package.as_deref(),
                            documentation,
                            location,
                        )?;
                        file.add_type(ty);
                    }
                    "enum" => {
                        let ty = self.parse_enum(
                            package.as_deref(),
                            package.as_deref(),
                            documentation,
                            location,
                        )?;
                        file.add_type(ty);
                    }
                    "service" | "extend" => self.skip_block()?,
                    other => {
                        return Err(SchemaError::syntax(location, format!("unexpected '{other}'")));
                    }
                },
                other => {
                    return Err(SchemaError::syntax(
                        location,
                        format!("unexpected {}", describe(&other)),
                    ));
                }
            }
        }

        file.package = package;
        Ok(file)
    }

    fn parse_message(
        &mut self,
        scope: Option<&str>,
        package: Option<&str>,
        documentation: String,
        location: Location,
    ) -> SchemaResult<Type> {
        let name = self.expect_simple_name()?;
        let full_name = qualify(scope, &name);
        self.expect_symbol('{')?;

        let mut body = MessageType::new();
        let mut nested_types = Vec::new();

        loop {
            let documentation = self.read_documentation();
            let Some(token) = self.next() else {
                return Err(self.unexpected_end());
            };
            let token_location = self.location.at(token.line, token.column);
            match token.kind {
                TokenKind::Symbol('}') => break,
                TokenKind::Symbol(';') => {}
                TokenKind::Ident(word) => match word.as_str() {
                    "message" => {
                        let nested = self.parse_message(
                            Some(&full_name),
                            package,
                            documentation,
                            token_location,
                        )?;
                        nested_types.push(nested);
                    }
                    "enum" => {
                        let nested = self.parse_enum(
                            Some(&full_name),
                            package,
                            documentation,
                            token_location,
                        )?;
                        nested_types.push(nested);
                    }
                    "option" => {
                        let (name, value) = self.parse_option_statement()?;
                        body.options.add(name, value);
                    }
                    "extensions" | "reserved" => self.skip_statement()?,
                    "extend" => self.skip_block()?,
                    "oneof" => {
                        self.expect_simple_name()?;
                        self.expect_symbol('{')?;
                        loop {
                            let documentation = self.read_documentation();
                            let Some(member) = self.next() else {
                                return Err(self.unexpected_end());
                            };
                            let member_location = self.location.at(member.line, member.column);
                            match member.kind {
                                TokenKind::Symbol('}') => break,
                                TokenKind::Symbol(';') => {}
                                TokenKind::Ident(type_name) if type_name == "option" => {
                                    self.parse_option_statement()?;
                                }
                                TokenKind::Ident(type_name) => {
                                    let field = self.parse_field(
                                        Label::Optional,
                                        &type_name,
                                        documentation,
                                        member_location,
                                    )?;
                                    body.add_field(field);
                                }
                                other => {
                                    return Err(SchemaError::syntax(
                                        member_location,
                                        format!("unexpected {} in oneof", describe(&other)),
                                    ));
                                }
                            }
                        }
                    }
                    "map" | "group" => {
                        return Err(SchemaError::syntax(
                            token_location,
                            format!("{word} fields are not supported"),
                        ));
                    }
                    "optional" | "required" | "repeated" => {
                        let label = match word.as_str() {
                            "required" => Label::Required,
                            "repeated" => Label::Repeated,
                            _ => Label::Optional,
                        };
                        let type_name = self.expect_ident()?;
                        if type_name == "group" || type_name == "map" {
                            return Err(SchemaError::syntax(
                                token_location,
                                format!("{type_name} fields are not supported"),
                            ));
                        }
                        let field =
                            self.parse_field(label, &type_name, documentation, token_location)?;
                        body.add_field(field);
                    }
                    type_name => {
                        let field = self.parse_field(
                            Label::Optional,
                            type_name,
                            documentation,
                            token_location,
                        )?;
                        body.add_field(field);
                    }
                },
                other => {
                    return Err(SchemaError::syntax(
                        token_location,
                        format!("unexpected {} in message {name}", describe(&other)),
                    ));
                }
            }
        }

        let mut ty = Type::new(full_name, location, TypeKind::Message(body));
        ty.package = package.map(str::to_string);
        ty.documentation = documentation;
        ty.nested_types = nested_types;
        Ok(ty)
    }

    fn parse_field(
        &mut self,
        label: Label,
        type_name: &str,
        mut documentation: String,
        location: Location,
    ) -> SchemaResult<Field> {
        let ty = match ScalarType::from_name(type_name) {
            Some(scalar) => ProtoType::Scalar(scalar),
            None => ProtoType::Named(type_name.to_string()),
        };
        let name = self.expect_simple_name()?;
        self.expect_symbol('=')?;
        let tag_location = self.current_location();
        let tag = self.expect_int()?;
        let tag = u32::try_from(tag)
            .map_err(|_| SchemaError::syntax(tag_location, format!("tag {tag} is out of range")))?;

        let mut field = Field::new(tag, name, label, ty);
        field.location = location;

        if self.peek_kind() == Some(&TokenKind::Symbol('[')) {
            self.next();
            loop {
                let option_name = self.parse_option_name()?;
                self.expect_symbol('=')?;
                let value = self.parse_constant()?;
                if option_name == "default" {
                    field.default = Some(value);
                } else {
                    field.options.add(option_name, value);
                }
                match self.next().map(|token| token.kind) {
                    Some(TokenKind::Symbol(',')) => continue,
                    Some(TokenKind::Symbol(']')) => break,
                    _ => return Err(self.error("expected ',' or ']' in field options")),
                }
            }
        }

        self.expect_symbol(';')?;
        if let Some(trailing) = self.read_trailing_comment() {
            if documentation.is_empty() {
                documentation = trailing;
            }
        }
        field.documentation = documentation;
        Ok(field)
    }

    fn parse_enum(
        &mut self,
        scope: Option<&str>,
        package: Option<&str>,
        documentation: String,
        location: Location,
    ) -> SchemaResult<Type> {
        let name = self.expect_simple_name()?;
        let full_name = qualify(scope, &name);
        self.expect_symbol('{')?;

        let mut body = EnumType::new();
        loop {
            let mut documentation = self.read_documentation();
            let Some(token) = self.next() else {
                return Err(self.unexpected_end());
            };
            let token_location = self.location.at(token.line, token.column);
            match token.kind {
                TokenKind::Symbol('}') => break,
                TokenKind::Symbol(';') => {}
                TokenKind::Ident(word) if word == "option" => {
                    let (option, value) = self.parse_option_statement()?;
                    body.options.add(option, value);
                }
                TokenKind::Ident(word) if word == "reserved" => self.skip_statement()?,
                TokenKind::Ident(constant_name) => {
                    self.expect_symbol('=')?;
                    let value = self.expect_int()?;
                    let value = i32::try_from(value).map_err(|_| {
                        SchemaError::syntax(
                            token_location.clone(),
                            format!("enum value {value} is out of range"),
                        )
                    })?;
                    let mut constant = EnumConstant::new(constant_name, value);
                    if self.peek_kind() == Some(&TokenKind::Symbol('[')) {
                        self.next();
                        loop {
                            let option_name = self.parse_option_name()?;
                            self.expect_symbol('=')?;
                            let option_value = self.parse_constant()?;
                            constant.options.add(option_name, option_value);
                            match self.next().map(|token| token.kind) {
                                Some(TokenKind::Symbol(',')) => continue,
                                Some(TokenKind::Symbol(']')) => break,
                                _ => {
                                    return Err(
                                        self.error("expected ',' or ']' in enum value options")
                                    );
                                }
                            }
                        }
                    }
                    self.expect_symbol(';')?;
                    if let Some(trailing) = self.read_trailing_comment() {
                        if documentation.is_empty() {
                            documentation = trailing;
                        }
                    }
                    constant.documentation = documentation;
                    body.add_constant(constant);
                }
                other => {
                    return Err(SchemaError::syntax(
                        token_location,
                        format!("unexpected {} in enum {name}", describe(&other)),
                    ));
                }
            }
        }

        let mut ty = Type::new(full_name, location, TypeKind::Enum(body));
        ty.package = package.map(str::to_string);
        ty.documentation = documentation;
        Ok(ty)
    }

    /// Parses `name = value ;` after the `option` keyword
    fn parse_option_statement(&mut self) -> SchemaResult<(String, String)> {
        let name = self.parse_option_name()?;
        self.expect_symbol('=')?;
        let value = self.parse_constant()?;
        self.expect_symbol(';')?;
        Ok((name, value))
    }

    /// Option names: `packed`, `(custom.opt)`, `(custom.opt).field`
    fn parse_option_name(&mut self) -> SchemaResult<String> {
        let mut name = String::new();
        loop {
            match self.peek_kind() {
                Some(TokenKind::Symbol('(')) => {
                    self.next();
                    let inner = self.expect_ident()?;
                    self.expect_symbol(')')?;
                    name.push('(');
                    name.push_str(&inner);
                    name.push(')');
                }
                Some(TokenKind::Ident(part)) => {
                    name.push_str(part);
                    self.next();
                }
                Some(TokenKind::Symbol('.')) => {
                    name.push('.');
                    self.next();
                }
                _ => break,
            }
        }
        if name.is_empty() {
            return Err(self.error("expected option name"));
        }
        Ok(name)
    }

    /// Option values: strings, identifiers, signed numbers, aggregates
    fn parse_constant(&mut self) -> SchemaResult<String> {
        let Some(token) = self.next() else {
            return Err(self.unexpected_end());
        };
        match token.kind {
            TokenKind::Str(mut value) => {
                while let Some(TokenKind::Str(more)) = self.peek_kind() {
                    value.push_str(more);
                    self.next();
                }
                Ok(value)
            }
            TokenKind::Ident(value) | TokenKind::Int(value) | TokenKind::Float(value) => Ok(value),
            TokenKind::Symbol('-') | TokenKind::Symbol('+') => {
                let sign = if token.kind == TokenKind::Symbol('-') { "-" } else { "" };
                match self.next().map(|token| token.kind) {
                    Some(
                        TokenKind::Int(value) | TokenKind::Float(value) | TokenKind::Ident(value),
                    ) => {
                        Ok(format!("{sign}{value}"))
                    }
                    _ => Err(self.error("expected number after sign")),
                }
            }
            TokenKind::Symbol('{') => {
                let mut depth = 1;
                let mut parts = vec!["{".to_string()];
                while depth > 0 {
                    let Some(token) = self.next() else {
                        return Err(self.unexpected_end());
                    };
                    match &token.kind {
                        TokenKind::Symbol('{') => depth += 1,
                        TokenKind::Symbol('}') => depth -= 1,
                        _ => {}
                    }
                    parts.push(render(&token.kind));
                }
                Ok(parts.join(" "))
            }
            other => Err(SchemaError::syntax(
                self.location.at(token.line, token.column),
                format!("expected a constant but was {}", describe(&other)),
            )),
        }
    }

    fn read_documentation(&mut self) -> String {
        let mut lines = Vec::new();
        while let Some(Token {
            kind: TokenKind::Comment(text),
            ..
        }) = self.tokens.get(self.pos)
        {
            lines.push(text.clone());
            self.pos += 1;
        }
        lines.join("\n")
    }

    fn read_trailing_comment(&mut self) -> Option<String> {
        match self.tokens.get(self.pos) {
            Some(Token {
                kind: TokenKind::Comment(text),
                line,
                ..
            }) if *line == self.last_line => {
                let text = text.clone();
                self.pos += 1;
                Some(text)
            }
            _ => None,
        }
    }

    fn skip_comments(&mut self) {
        while let Some(Token {
            kind: TokenKind::Comment(_),
            ..
        }) = self.tokens.get(self.pos)
        {
            self.pos += 1;
        }
    }

    fn peek_kind(&mut self) -> Option<&TokenKind> {
        self.skip_comments();
        self.tokens.get(self.pos).map(|token| &token.kind)
    }

    fn next(&mut self) -> Option<Token> {
        self.skip_comments();
        let token = self.tokens.get(self.pos).cloned()?;
        self.pos += 1;
        self.last_line = token.line;
        Some(token)
    }

    fn skip_statement(&mut self) -> SchemaResult<()> {
        loop {
            match self.next().map(|token| token.kind) {
                Some(TokenKind::Symbol(';')) => return Ok(()),
                Some(_) => {}
                None => return Err(self.unexpected_end()),
            }
        }
    }

    fn skip_block(&mut self) -> SchemaResult<()> {
        loop {
            match self.next().map(|token| token.kind) {
                Some(TokenKind::Symbol('{')) => break,
                Some(_) => {}
                None => return Err(self.unexpected_end()),
            }
        }
        let mut depth = 1;
        while depth > 0 {
            match self.next().map(|token| token.kind) {
                Some(TokenKind::Symbol('{')) => depth += 1,
                Some(TokenKind::Symbol('}')) => depth -= 1,
                Some(_) => {}
                None => return Err(self.unexpected_end()),
            }
        }
        Ok(())
    }

    fn expect_symbol(&mut self, expected: char) -> SchemaResult<()> {
        match self.next() {
            Some(Token {
                kind: TokenKind::Symbol(c),
                ..
            }) if c == expected => Ok(()),
            Some(token) => Err(SchemaError::syntax(
                self.location.at(token.line, token.column),
                format!("expected '{expected}' but was {}", describe(&token.kind)),
            )),
            None => Err(self.unexpected_end()),
        }
    }

    fn expect_ident(&mut self) -> SchemaResult<String> {
        match self.next() {
            Some(Token {
                kind: TokenKind::Ident(name),
                ..
            }) => Ok(name),
            Some(token) => Err(SchemaError::syntax(
                self.location.at(token.line, token.column),
                format!("expected an identifier but was {}", describe(&token.kind)),
            )),
            None => Err(self.unexpected_end()),
        }
    }

    fn expect_simple_name(&mut self) -> SchemaResult<String> {
        let location = self.current_location();
        let name = self.expect_ident()?;
        if name.contains('.') {
            return Err(SchemaError::syntax(location, format!("'{name}' is not a simple name")));
        }
        Ok(name)
    }

    fn expect_string(&mut self) -> SchemaResult<String> {
        match self.next() {
            Some(Token {
                kind: TokenKind::Str(value),
                ..
            }) => Ok(value),
            Some(token) => Err(SchemaError::syntax(
                self.location.at(token.line, token.column),
                format!("expected a string but was {}", describe(&token.kind)),
            )),
            None => Err(self.unexpected_end()),
        }
    }

    fn expect_int(&mut self) -> SchemaResult<i64> {
        let negative = self.peek_kind() == Some(&TokenKind::Symbol('-'));
        if negative {
            self.next();
        }
        match self.next() {
            Some(Token {
                kind: TokenKind::Int(text),
                line,
                column,
            }) => {
                let magnitude = parse_int(&text).ok_or_else(|| {
                    SchemaError::syntax(
                        self.location.at(line, column),
                        format!("invalid integer {text}"),
                    )
                })?;
                Ok(if negative { -magnitude } else { magnitude })
            }
            Some(token) => Err(SchemaError::syntax(
                self.location.at(token.line, token.column),
                format!("expected an integer but was {}", describe(&token.kind)),
            )),
            None => Err(self.unexpected_end()),
        }
    }

    fn current_location(&mut self) -> Location {
        self.skip_comments();
        match self.tokens.get(self.pos) {
            Some(token) => self.location.at(token.line, token.column),
            None => self.location.clone(),
        }
    }

    fn error(&mut self, message: &str) -> SchemaError {
        let location = self.current_location();
        SchemaError::syntax(location, message)
    }

    fn unexpected_end(&self) -> SchemaError {
        SchemaError::syntax(self.location.clone(), "unexpected end of file")
    }
}

fn qualify(scope: Option<&str>, name: &str) -> String {
    match scope {
        Some(scope) if !scope.is_empty() => format!("{scope}.{name}"),
        _ => name.to_string(),
    }
}

fn parse_int(text: &str) -> Option<i64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else if text.len() > 1 && text.starts_with('0') {
        i64::from_str_radix(&text[1..], 8).ok()
    } else {
        text.parse().ok()
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Ident(name) => format!("'{name}'"),
        TokenKind::Int(text) | TokenKind::Float(text) => format!("number {text}"),
        TokenKind::Str(value) => format!("string \"{value}\""),
        TokenKind::Symbol(c) => format!("'{c}'"),
        TokenKind::Comment(_) => "comment".to_string(),
    }
}

fn render(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Ident(text) | TokenKind::Int(text) | TokenKind::Float(text) => text.clone(),
        TokenKind::Str(value) => format!("\"{value}\""),
        TokenKind::Symbol(c) => c.to_string(),
        TokenKind::Comment(_) => String::new(),
    }
}
