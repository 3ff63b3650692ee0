// Rust source → [`SourceTree`] via `syn`.
//
// Comments, doc attributes and formatting never reach the tree. Token text
// used as leaf values is re-printed from the syntax tree, so spacing in the
// original source does not matter.

use proc_macro2::{Delimiter, Group, Span, TokenStream, TokenTree};
use quote::ToTokens;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::token::{Comma, Paren};
use syn::{
    Attribute, Block, Expr, Field, Fields, FnArg, Generics, Ident, ImplItem, Item, ItemUse, Pat,
    ReturnType, Signature, StaticMutability, Stmt, TraitItem, Type, UseTree, Variant, Visibility,
};
use tracing::debug;

use crate::domain::ast::{Node, NodeKind, SourceSpan, SourceTree};
use crate::domain::error::ParseError;
use crate::domain::source_file::SourceFile;
use crate::ports::SourceParser;

pub struct SynSourceParser;

impl SourceParser for SynSourceParser {
    fn parse(&self, file: &SourceFile) -> Result<SourceTree, ParseError> {
        let text = file.parse_text()?;
        let ast = syn::parse_file(text).map_err(|err| {
            let start = err.span().start();
            ParseError::Syntax {
                file: file.name().to_string(),
                line: start.line,
                column: start.column,
                message: err.to_string(),
            }
        })?;

        let mut children = vec![modifiers(&ast.attrs, None, Vec::new())];
        for item in &ast.items {
            lower_item(item, &mut children);
        }
        let root = Node::branch(NodeKind::File, children, None);
        debug!(file = file.name(), nodes = root.size(), "parsed source tree");
        Ok(SourceTree::new(file.name(), text, root))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Leaves
// ═══════════════════════════════════════════════════════════════════════════

fn location(span: Span) -> Option<SourceSpan> {
    let (start, end) = (span.start(), span.end());
    // Zero-width spans come from synthesized tokens and empty nodes.
    if (start.line, start.column) == (end.line, end.column) {
        return None;
    }
    Some(SourceSpan::new(start.line, start.column, end.line, end.column))
}

fn spanned<T: Spanned>(node: &T) -> Option<SourceSpan> {
    location(node.span())
}

fn tokens<T: ToTokens>(node: &T) -> String {
    node.to_token_stream().to_string()
}

fn leaf<T: ToTokens + Spanned>(kind: NodeKind, node: &T) -> Node {
    Node::leaf(kind, tokens(node), spanned(node))
}

/// Leaf holding the printed tokens of a construct that is not lowered further.
fn verbatim<T: ToTokens + Spanned>(node: &T) -> Node {
    let text = strip_docs(node.to_token_stream()).to_string();
    Node::leaf(NodeKind::Verbatim, text, spanned(node))
}

/// Remove `#[doc = ..]` and `#![doc = ..]` attributes at every nesting level.
fn strip_docs(tokens: TokenStream) -> TokenStream {
    let trees: Vec<TokenTree> = tokens.into_iter().collect();
    let mut out = TokenStream::new();
    let mut index = 0;
    while index < trees.len() {
        if let Some(skip) = doc_attribute_len(&trees[index..]) {
            index += skip;
            continue;
        }
        match &trees[index] {
            TokenTree::Group(group) => {
                let mut stripped = Group::new(group.delimiter(), strip_docs(group.stream()));
                stripped.set_span(group.span());
                out.extend([TokenTree::Group(stripped)]);
            }
            other => out.extend([other.clone()]),
        }
        index += 1;
    }
    out
}

fn doc_attribute_len(trees: &[TokenTree]) -> Option<usize> {
    match trees {
        [TokenTree::Punct(hash), TokenTree::Group(body), ..]
            if hash.as_char() == '#' && is_doc_body(body) =>
        {
            Some(2)
        }
        [TokenTree::Punct(hash), TokenTree::Punct(bang), TokenTree::Group(body), ..]
            if hash.as_char() == '#' && bang.as_char() == '!' && is_doc_body(body) =>
        {
            Some(3)
        }
        _ => None,
    }
}

fn is_doc_body(body: &Group) -> bool {
    body.delimiter() == Delimiter::Bracket
        && matches!(body.stream().into_iter().next(), Some(TokenTree::Ident(name)) if name == "doc")
}

fn ident(ident: &Ident) -> Node {
    Node::leaf(NodeKind::Identifier, ident.to_string(), location(ident.span()))
}

fn type_ref(ty: &Type) -> Node {
    leaf(NodeKind::TypeRef, ty)
}

fn pattern(pat: &Pat) -> Node {
    leaf(NodeKind::Pattern, pat)
}

fn keyword<T: ToTokens + Spanned>(token: &Option<T>) -> Option<Node> {
    token.as_ref().map(|t| leaf(NodeKind::Modifier, t))
}

fn is_doc(attr: &Attribute) -> bool {
    attr.path().is_ident("doc")
}

fn modifiers(attrs: &[Attribute], vis: Option<&Visibility>, keywords: Vec<Option<Node>>) -> Node {
    let mut children: Vec<Node> = attrs
        .iter()
        .filter(|attr| !is_doc(attr))
        .map(|attr| leaf(NodeKind::Modifier, attr))
        .collect();
    if let Some(vis) = vis {
        if !matches!(vis, Visibility::Inherited) {
            children.push(leaf(NodeKind::Modifier, vis));
        }
    }
    children.extend(keywords.into_iter().flatten());
    Node::branch(NodeKind::Modifiers, children, None)
}

fn generics(generics: &Generics) -> Node {
    let mut children: Vec<Node> = generics
        .params
        .iter()
        .map(verbatim)
        .collect();
    if let Some(clause) = &generics.where_clause {
        let predicates = clause
            .predicates
            .iter()
            .map(verbatim)
            .collect();
        children.push(Node::branch(NodeKind::WhereClause, predicates, spanned(clause)));
    }
    Node::branch(NodeKind::Generics, children, spanned(generics))
}

// ═══════════════════════════════════════════════════════════════════════════
// Items
// ═══════════════════════════════════════════════════════════════════════════

fn lower_item(item: &Item, out: &mut Vec<Node>) {
    let node = match item {
        Item::Use(item) => {
            lower_use(item, out);
            return;
        }
        Item::Struct(s) => {
            let mut children = vec![
                modifiers(&s.attrs, Some(&s.vis), Vec::new()),
                ident(&s.ident),
                generics(&s.generics),
            ];
            children.extend(fields(&s.fields));
            Node::branch(NodeKind::Struct, children, spanned(s))
        }
        Item::Enum(e) => {
            let variants = Node::branch(
                NodeKind::Variants,
                e.variants.iter().map(variant).collect(),
                location(e.brace_token.span.join()),
            );
            Node::branch(
                NodeKind::Enum,
                vec![
                    modifiers(&e.attrs, Some(&e.vis), Vec::new()),
                    ident(&e.ident),
                    generics(&e.generics),
                    variants,
                ],
                spanned(e),
            )
        }
        Item::Union(u) => Node::branch(
            NodeKind::Union,
            vec![
                modifiers(&u.attrs, Some(&u.vis), Vec::new()),
                ident(&u.ident),
                generics(&u.generics),
                Node::branch(
                    NodeKind::NamedFields,
                    u.fields.named.iter().map(field).collect(),
                    location(u.fields.brace_token.span.join()),
                ),
            ],
            spanned(u),
        ),
        Item::Fn(f) => function(&f.attrs, Some(&f.vis), None, &f.sig, Some(&*f.block), spanned(f)),
        Item::Mod(m) => {
            let mut children = vec![
                modifiers(&m.attrs, Some(&m.vis), vec![keyword(&m.unsafety)]),
                ident(&m.ident),
            ];
            if let Some((brace, items)) = &m.content {
                let mut nested = Vec::new();
                for item in items {
                    lower_item(item, &mut nested);
                }
                children.push(Node::branch(NodeKind::Items, nested, location(brace.span.join())));
            }
            Node::branch(NodeKind::Module, children, spanned(m))
        }
        Item::Trait(t) => {
            let mut children = vec![
                modifiers(
                    &t.attrs,
                    Some(&t.vis),
                    vec![keyword(&t.unsafety), keyword(&t.auto_token)],
                ),
                ident(&t.ident),
                generics(&t.generics),
            ];
            if !t.supertraits.is_empty() {
                children.push(leaf(NodeKind::TypeRef, &t.supertraits));
            }
            children.push(Node::branch(
                NodeKind::Members,
                t.items.iter().map(trait_item).collect(),
                location(t.brace_token.span.join()),
            ));
            Node::branch(NodeKind::Trait, children, spanned(t))
        }
        Item::Impl(i) => {
            let mut children = vec![
                modifiers(&i.attrs, None, vec![keyword(&i.defaultness), keyword(&i.unsafety)]),
                generics(&i.generics),
            ];
            if let Some((bang, path, _)) = &i.trait_ {
                let negation = if bang.is_some() { "!" } else { "" };
                children.push(Node::leaf(
                    NodeKind::TypeRef,
                    format!("{}{}", negation, tokens(path)),
                    spanned(path),
                ));
            }
            children.push(type_ref(&i.self_ty));
            children.push(Node::branch(
                NodeKind::Members,
                i.items.iter().map(impl_item).collect(),
                location(i.brace_token.span.join()),
            ));
            Node::branch(NodeKind::Impl, children, spanned(i))
        }
        Item::Const(c) => Node::branch(
            NodeKind::Const,
            vec![
                modifiers(&c.attrs, Some(&c.vis), Vec::new()),
                ident(&c.ident),
                type_ref(&c.ty),
                expr(&c.expr),
            ],
            spanned(c),
        ),
        Item::Static(s) => {
            let mutability = match &s.mutability {
                StaticMutability::Mut(token) => Some(leaf(NodeKind::Modifier, token)),
                _ => None,
            };
            Node::branch(
                NodeKind::Static,
                vec![
                    modifiers(&s.attrs, Some(&s.vis), vec![mutability]),
                    ident(&s.ident),
                    type_ref(&s.ty),
                    expr(&s.expr),
                ],
                spanned(s),
            )
        }
        Item::Type(t) => Node::branch(
            NodeKind::TypeAlias,
            vec![
                modifiers(&t.attrs, Some(&t.vis), Vec::new()),
                ident(&t.ident),
                generics(&t.generics),
                type_ref(&t.ty),
            ],
            spanned(t),
        ),
        other => verbatim(other),
    };
    out.push(node);
}

/// One `Use` leaf per imported path, so grouping and order are irrelevant.
fn lower_use(item: &ItemUse, out: &mut Vec<Node>) {
    let mut prefix: String = item
        .attrs
        .iter()
        .filter(|attr| !is_doc(attr))
        .map(|attr| format!("{} ", tokens(attr)))
        .collect();
    if !matches!(item.vis, Visibility::Inherited) {
        prefix.push_str(&format!("{} ", tokens(&item.vis)));
    }
    prefix.push_str("use ");
    if item.leading_colon.is_some() {
        prefix.push_str("::");
    }

    let mut paths = Vec::new();
    flatten_use(&item.tree, prefix, &mut paths);
    let span = spanned(item);
    out.extend(paths.into_iter().map(|path| Node::leaf(NodeKind::Use, path, span)));
}

fn flatten_use(tree: &UseTree, prefix: String, out: &mut Vec<String>) {
    match tree {
        UseTree::Path(path) => flatten_use(&path.tree, format!("{}{}::", prefix, path.ident), out),
        UseTree::Name(name) => out.push(format!("{}{}", prefix, name.ident)),
        UseTree::Rename(rename) => {
            out.push(format!("{}{} as {}", prefix, rename.ident, rename.rename))
        }
        UseTree::Glob(_) => out.push(format!("{}*", prefix)),
        UseTree::Group(group) => {
            for tree in &group.items {
                flatten_use(tree, prefix.clone(), out);
            }
        }
    }
}

fn fields(fields: &Fields) -> Option<Node> {
    match fields {
        Fields::Named(named) => Some(Node::branch(
            NodeKind::NamedFields,
            named.named.iter().map(field).collect(),
            location(named.brace_token.span.join()),
        )),
        Fields::Unnamed(unnamed) => Some(Node::branch(
            NodeKind::TupleFields,
            unnamed.unnamed.iter().map(field).collect(),
            location(unnamed.paren_token.span.join()),
        )),
        Fields::Unit => None,
    }
}

fn field(field: &Field) -> Node {
    let mut children = vec![modifiers(&field.attrs, Some(&field.vis), Vec::new())];
    if let Some(name) = &field.ident {
        children.push(ident(name));
    }
    children.push(type_ref(&field.ty));
    Node::branch(NodeKind::Field, children, spanned(field))
}

fn variant(variant: &Variant) -> Node {
    let mut children = vec![modifiers(&variant.attrs, None, Vec::new()), ident(&variant.ident)];
    children.extend(fields(&variant.fields));
    if let Some((_, discriminant)) = &variant.discriminant {
        children.push(expr(discriminant));
    }
    Node::branch(NodeKind::Variant, children, spanned(variant))
}

fn function(
    attrs: &[Attribute],
    vis: Option<&Visibility>,
    defaultness: Option<Node>,
    sig: &Signature,
    body: Option<&Block>,
    span: Option<SourceSpan>,
) -> Node {
    let keywords = vec![
        defaultness,
        keyword(&sig.constness),
        keyword(&sig.asyncness),
        keyword(&sig.unsafety),
        keyword(&sig.abi),
    ];
    let mut params: Vec<Node> = sig.inputs.iter().map(parameter).collect();
    if let Some(variadic) = &sig.variadic {
        params.push(verbatim(variadic));
    }
    let output = match &sig.output {
        ReturnType::Default => Vec::new(),
        ReturnType::Type(_, ty) => vec![type_ref(ty)],
    };

    let mut children = vec![
        modifiers(attrs, vis, keywords),
        ident(&sig.ident),
        generics(&sig.generics),
        Node::branch(NodeKind::Parameters, params, location(sig.paren_token.span.join())),
        Node::branch(NodeKind::ReturnType, output, spanned(&sig.output)),
    ];
    if let Some(body) = body {
        children.push(block(body));
    }
    Node::branch(NodeKind::Function, children, span)
}

fn parameter(arg: &FnArg) -> Node {
    let children = match arg {
        FnArg::Receiver(receiver) => vec![leaf(NodeKind::Pattern, receiver)],
        FnArg::Typed(typed) => vec![pattern(&typed.pat), type_ref(&typed.ty)],
    };
    Node::branch(NodeKind::Parameter, children, spanned(arg))
}

fn trait_item(item: &TraitItem) -> Node {
    match item {
        TraitItem::Fn(f) => function(&f.attrs, None, None, &f.sig, f.default.as_ref(), spanned(f)),
        TraitItem::Const(c) => {
            let mut children = vec![
                modifiers(&c.attrs, None, Vec::new()),
                ident(&c.ident),
                type_ref(&c.ty),
            ];
            if let Some((_, default)) = &c.default {
                children.push(expr(default));
            }
            Node::branch(NodeKind::Const, children, spanned(c))
        }
        TraitItem::Type(t) => {
            let mut children = vec![
                modifiers(&t.attrs, None, Vec::new()),
                ident(&t.ident),
                generics(&t.generics),
            ];
            if !t.bounds.is_empty() {
                children.push(leaf(NodeKind::TypeRef, &t.bounds));
            }
            if let Some((_, default)) = &t.default {
                children.push(type_ref(default));
            }
            Node::branch(NodeKind::TypeAlias, children, spanned(t))
        }
        other => verbatim(other),
    }
}

fn impl_item(item: &ImplItem) -> Node {
    match item {
        ImplItem::Fn(f) => function(
            &f.attrs,
            Some(&f.vis),
            keyword(&f.defaultness),
            &f.sig,
            Some(&f.block),
            spanned(f),
        ),
        ImplItem::Const(c) => Node::branch(
            NodeKind::Const,
            vec![
                modifiers(&c.attrs, Some(&c.vis), vec![keyword(&c.defaultness)]),
                ident(&c.ident),
                type_ref(&c.ty),
                expr(&c.expr),
            ],
            spanned(c),
        ),
        ImplItem::Type(t) => Node::branch(
            NodeKind::TypeAlias,
            vec![
                modifiers(&t.attrs, Some(&t.vis), vec![keyword(&t.defaultness)]),
                ident(&t.ident),
                generics(&t.generics),
                type_ref(&t.ty),
            ],
            spanned(t),
        ),
        other => verbatim(other),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Statements and expressions
// ═══════════════════════════════════════════════════════════════════════════

fn block(block: &Block) -> Node {
    let mut statements = Vec::new();
    for stmt in &block.stmts {
        lower_stmt(stmt, &mut statements);
    }
    Node::branch(NodeKind::Block, statements, location(block.brace_token.span.join()))
}

fn lower_stmt(stmt: &Stmt, out: &mut Vec<Node>) {
    let node = match stmt {
        Stmt::Local(local) => {
            let mut children = vec![pattern(&local.pat)];
            if let Some(init) = &local.init {
                children.push(expr(&init.expr));
                if let Some((_, diverge)) = &init.diverge {
                    children.push(expr(diverge));
                }
            }
            Node::branch(NodeKind::Let, children, spanned(local))
        }
        Stmt::Item(item) => {
            lower_item(item, out);
            return;
        }
        Stmt::Expr(e, Some(_)) => Node::branch(NodeKind::Statement, vec![expr(e)], spanned(stmt)),
        Stmt::Expr(e, None) => expr(e),
        Stmt::Macro(m) => {
            let invocation = verbatim(&m.mac);
            match m.semi_token {
                Some(_) => Node::branch(NodeKind::Statement, vec![invocation], spanned(m)),
                None => invocation,
            }
        }
    };
    out.push(node);
}

fn arguments(args: &Punctuated<Expr, Comma>, paren: &Paren) -> Node {
    Node::branch(
        NodeKind::Arguments,
        args.iter().map(expr).collect(),
        location(paren.span.join()),
    )
}

fn expr(e: &Expr) -> Node {
    let span = spanned(e);
    let (kind, children) = match e {
        Expr::Paren(inner) => return expr(&inner.expr),
        Expr::Group(inner) => return expr(&inner.expr),
        Expr::Lit(lit) => return Node::leaf(NodeKind::Literal, tokens(&lit.lit), span),
        Expr::Path(path) => return Node::leaf(NodeKind::Identifier, tokens(path), span),
        Expr::Block(b) => return block(&b.block),
        Expr::Call(call) => (
            NodeKind::Call,
            vec![expr(&call.func), arguments(&call.args, &call.paren_token)],
        ),
        Expr::MethodCall(call) => {
            let mut children = vec![expr(&call.receiver), ident(&call.method)];
            if let Some(turbofish) = &call.turbofish {
                children.push(leaf(NodeKind::TypeRef, turbofish));
            }
            children.push(arguments(&call.args, &call.paren_token));
            (NodeKind::MethodCall, children)
        }
        Expr::Binary(binary) => (
            NodeKind::Binary,
            vec![
                expr(&binary.left),
                leaf(NodeKind::Operator, &binary.op),
                expr(&binary.right),
            ],
        ),
        Expr::Unary(unary) => (
            NodeKind::Unary,
            vec![leaf(NodeKind::Operator, &unary.op), expr(&unary.expr)],
        ),
        Expr::Field(access) => (
            NodeKind::FieldAccess,
            vec![expr(&access.base), leaf(NodeKind::Identifier, &access.member)],
        ),
        Expr::Return(ret) => (NodeKind::Return, ret.expr.iter().map(|e| expr(e)).collect()),
        Expr::If(branch) => {
            let mut children = vec![expr(&branch.cond), block(&branch.then_branch)];
            if let Some((_, otherwise)) = &branch.else_branch {
                children.push(expr(otherwise));
            }
            (NodeKind::If, children)
        }
        Expr::While(looped) => (NodeKind::While, vec![expr(&looped.cond), block(&looped.body)]),
        Expr::ForLoop(looped) => (
            NodeKind::ForLoop,
            vec![pattern(&looped.pat), expr(&looped.expr), block(&looped.body)],
        ),
        Expr::Loop(looped) => (NodeKind::Loop, vec![block(&looped.body)]),
        Expr::Match(matched) => {
            let mut children = vec![expr(&matched.expr)];
            for arm in &matched.arms {
                let mut parts = vec![pattern(&arm.pat)];
                if let Some((_, guard)) = &arm.guard {
                    parts.push(expr(guard));
                }
                parts.push(expr(&arm.body));
                children.push(Node::branch(NodeKind::MatchArm, parts, spanned(arm)));
            }
            (NodeKind::Match, children)
        }
        Expr::Assign(assign) => (NodeKind::Assign, vec![expr(&assign.left), expr(&assign.right)]),
        Expr::Reference(reference) => {
            let mut children: Vec<Node> = keyword(&reference.mutability).into_iter().collect();
            children.push(expr(&reference.expr));
            (NodeKind::Reference, children)
        }
        Expr::Tuple(tuple) => (NodeKind::Tuple, tuple.elems.iter().map(expr).collect()),
        Expr::Array(array) => (NodeKind::Array, array.elems.iter().map(expr).collect()),
        Expr::Await(awaited) => (NodeKind::Await, vec![expr(&awaited.base)]),
        Expr::Try(tried) => (NodeKind::Try, vec![expr(&tried.expr)]),
        Expr::Macro(mac) => return verbatim(&mac.mac),
        other => return verbatim(other),
    };
    Node::branch(kind, children, span)
}
