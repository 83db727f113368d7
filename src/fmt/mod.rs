//! SQL pretty-printer.
//!
//! A statement is first lowered to a list of clauses, each a keyword plus
//! elements made of text and nested queries. A clause is written on one line
//! when it fits `max_line_length`; otherwise the keyword stands alone and each
//! element gets its own line one level deeper. Nested queries that do not fit
//! open `(` inline and close `)` on a line of their own. Expressions and
//! function calls are rendered by a fold over the shared [`Visit`] traversal.
//!
//! The output depends only on the tree and the style, so formatting is
//! idempotent as long as the printed text parses back to the same tree.

use std::collections::HashMap;

use crate::ast::*;
use crate::config::{CommaStyle, FormatStyle, KeywordCase};

mod render;

use render::ExprRenderer;

/// Format every statement of `script`.
pub fn format_script(script: &Script, style: &FormatStyle) -> String {
    let out = Formatter::new(style).format(script);
    tracing::debug!(
        statements = script.statements.len(),
        indent = style.indent_width,
        max = ?style.max_line_length,
        "formatted script"
    );
    out
}

/// Format one statement; comments are not available at this level.
pub fn format_statement(statement: &Statement, style: &FormatStyle) -> String {
    Formatter::new(style).format_statement(statement)
}

enum Piece<'q> {
    Text(String),
    /// Nested query, broken onto its own lines only when needed.
    Sub(&'q Query),
    /// Nested query that is always broken (CTE bodies).
    Block(&'q Query),
}

/// Piece buffer that merges adjacent text.
struct Pieces<'q>(Vec<Piece<'q>>);

impl<'q> Pieces<'q> {
    fn new() -> Self {
        Self(Vec::new())
    }

    fn text(&mut self, s: &str) {
        match self.0.last_mut() {
            Some(Piece::Text(t)) => t.push_str(s),
            _ => self.0.push(Piece::Text(s.to_string())),
        }
    }

    fn sub(&mut self, query: &'q Query) {
        self.0.push(Piece::Sub(query));
    }

    fn block(&mut self, query: &'q Query) {
        self.0.push(Piece::Block(query));
    }

    fn append(&mut self, other: Pieces<'q>) {
        for piece in other.0 {
            match piece {
                Piece::Text(t) => self.text(&t),
                piece => self.0.push(piece),
            }
        }
    }
}

struct Element<'q> {
    /// Separated from the previous element by a comma.
    comma_before: bool,
    pieces: Vec<Piece<'q>>,
}

impl<'q> Element<'q> {
    fn new(comma_before: bool, pieces: Pieces<'q>) -> Self {
        Self {
            comma_before,
            pieces: pieces.0,
        }
    }
}

struct Clause<'q> {
    anchor: Option<ClauseKind>,
    keyword: String,
    elements: Vec<Element<'q>>,
    /// One element per line regardless of width.
    force_break: bool,
    /// Closing text on its own line after broken elements.
    close: Option<&'static str>,
}

impl<'q> Clause<'q> {
    fn new(anchor: Option<ClauseKind>, keyword: String) -> Self {
        Self {
            anchor,
            keyword,
            elements: Vec::new(),
            force_break: false,
            close: None,
        }
    }

    fn with_elements(mut self, elements: Vec<Element<'q>>) -> Self {
        self.elements = elements;
        self
    }
}

fn has_block(pieces: &[Piece<'_>]) -> bool {
    pieces.iter().any(|p| match p {
        Piece::Block(_) => true,
        Piece::Sub(q) => q.with.is_some(),
        Piece::Text(_) => false,
    })
}

fn idents(list: &[Ident]) -> String {
    list.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}

fn dotted(parts: &[Ident]) -> String {
    parts.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(".")
}

/// Leftmost token of `e` would be a `-` sign.
fn starts_with_minus(e: &Expr) -> bool {
    match e {
        Expr::Unary {
            op: UnaryOp::Minus, ..
        } => true,
        Expr::Binary { left, .. } => starts_with_minus(left),
        Expr::Cast {
            expr,
            style: CastStyle::DoubleColon,
            ..
        } => starts_with_minus(expr),
        _ => false,
    }
}

/// Operand on the right of an operator at level `prec`.
fn right_needs_parens(e: &Expr, prec: u8) -> bool {
    e.precedence() <= prec && !matches!(e, Expr::Unary { .. })
}

/// Renders statements into lines.
pub struct Formatter<'s> {
    style: &'s FormatStyle,
    upper: bool,
    lines: Vec<String>,
    /// Comments of the current statement not yet written.
    comments: Vec<&'s Comment>,
    /// Top-level clauses written so far, by kind.
    seen: HashMap<ClauseKind, usize>,
}

impl<'s> Formatter<'s> {
    pub fn new(style: &'s FormatStyle) -> Self {
        Self {
            style,
            upper: style.keyword_case != KeywordCase::Lower,
            lines: Vec::new(),
            comments: Vec::new(),
            seen: HashMap::new(),
        }
    }

    pub fn format(mut self, script: &'s Script) -> String {
        self.upper = match self.style.keyword_case {
            KeywordCase::Upper => true,
            KeywordCase::Lower => false,
            KeywordCase::Preserve => !script.lowercase_keywords,
        };

        let mut out = String::new();
        let count = script.statements.len();
        for (i, parsed) in script.statements.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            self.lines.clear();
            self.seen.clear();
            self.comments = parsed.comments.iter().collect();
            self.statement(&parsed.statement);

            out.push_str(&self.lines.join("\n"));
            if i + 1 < count || script.trailing_semicolon {
                out.push(';');
            }
            // unplaced comments go after the statement
            for comment in std::mem::take(&mut self.comments) {
                out.push('\n');
                out.push_str(&comment.text);
            }
        }
        for comment in &script.trailing_comments {
            out.push('\n');
            out.push_str(&comment.text);
        }
        out
    }

    pub fn format_statement(mut self, statement: &Statement) -> String {
        self.statement(statement);
        self.lines.join("\n")
    }

    fn statement(&mut self, statement: &Statement) {
        let clauses = self.statement_clauses(statement);
        for clause in &clauses {
            self.write_clause(clause, 0, true);
        }
    }

    // ---- writing ----

    fn kw(&self, keyword: &str) -> String {
        if self.upper {
            keyword.to_uppercase()
        } else {
            keyword.to_lowercase()
        }
    }

    fn indent(&self, depth: usize) -> String {
        " ".repeat(depth * self.style.indent_width)
    }

    fn fits(&self, depth: usize, text: &str) -> bool {
        match self.style.max_line_length {
            None => true,
            Some(max) => depth * self.style.indent_width + text.chars().count() <= max,
        }
    }

    fn line(&mut self, depth: usize, text: &str) {
        let line = format!("{}{}", self.indent(depth), text);
        self.lines.push(line);
    }

    fn comments_before(&mut self, kind: ClauseKind, depth: usize) {
        let counter = self.seen.entry(kind).or_insert(0);
        let anchor = CommentAnchor::Clause {
            kind,
            ordinal: *counter,
        };
        *counter += 1;

        let (here, rest): (Vec<&Comment>, Vec<&Comment>) = std::mem::take(&mut self.comments)
            .into_iter()
            .partition(|c| c.anchor == anchor);
        self.comments = rest;
        for comment in here {
            self.line(depth, &comment.text);
        }
    }

    fn write_query(&mut self, query: &Query, depth: usize, top: bool) {
        let clauses = self.query_clauses(query);
        for clause in &clauses {
            self.write_clause(clause, depth, top);
        }
    }

    fn write_clause(&mut self, clause: &Clause<'_>, depth: usize, top: bool) {
        if top && let Some(kind) = clause.anchor {
            self.comments_before(kind, depth);
        }

        if clause.force_break {
            self.line(depth, &clause.keyword);
            self.write_elements(&clause.elements, depth + 1);
            if let Some(close) = clause.close {
                self.line(depth, close);
            }
            return;
        }
        if clause.elements.is_empty() {
            self.line(depth, &clause.keyword);
            return;
        }

        let inline = self.clause_inline(clause);
        let blocks = clause.elements.iter().any(|e| has_block(&e.pieces));
        if !blocks && self.fits(depth, &inline) {
            self.line(depth, &inline);
            return;
        }
        if let [only] = clause.elements.as_slice() {
            let lead = if clause.keyword.is_empty() {
                String::new()
            } else {
                format!("{} ", clause.keyword)
            };
            self.write_pieces(depth, &lead, &only.pieces, "");
            return;
        }
        self.line(depth, &clause.keyword);
        self.write_elements(&clause.elements, depth + 1);
    }

    fn write_elements(&mut self, elements: &[Element<'_>], depth: usize) {
        let leading = self.style.comma_style == CommaStyle::Leading;
        for (i, element) in elements.iter().enumerate() {
            let lead = if element.comma_before && leading { ", " } else { "" };
            let comma_follows = elements.get(i + 1).is_some_and(|next| next.comma_before);
            let trail = if comma_follows && !leading { "," } else { "" };
            self.write_pieces(depth, lead, &element.pieces, trail);
        }
    }

    /// One element: on a single line when it fits, else with every nested
    /// query opened inline and closed on its own line.
    fn write_pieces(&mut self, depth: usize, lead: &str, pieces: &[Piece<'_>], trail: &str) {
        let inline = format!("{}{}{}", lead, self.inline(pieces), trail);
        if !has_block(pieces) && self.fits(depth, &inline) {
            self.line(depth, &inline);
            return;
        }
        let mut current = lead.to_string();
        for piece in pieces {
            match piece {
                Piece::Text(t) => current.push_str(t),
                Piece::Sub(q) | Piece::Block(q) => {
                    current.push('(');
                    self.line(depth, &current);
                    self.write_query(q, depth + 1, false);
                    current = ")".to_string();
                }
            }
        }
        current.push_str(trail);
        self.line(depth, &current);
    }

    // ---- inline rendering ----

    fn inline(&self, pieces: &[Piece<'_>]) -> String {
        let mut out = String::new();
        for piece in pieces {
            match piece {
                Piece::Text(t) => out.push_str(t),
                Piece::Sub(q) | Piece::Block(q) => {
                    out.push('(');
                    out.push_str(&self.query_inline(q));
                    out.push(')');
                }
            }
        }
        out
    }

    fn clause_inline(&self, clause: &Clause<'_>) -> String {
        let mut out = clause.keyword.clone();
        if let Some(close) = clause.close {
            let items: Vec<String> = clause.elements.iter().map(|e| self.inline(&e.pieces)).collect();
            out.push_str(&items.join(", "));
            out.push_str(close);
            return out;
        }
        for (i, element) in clause.elements.iter().enumerate() {
            if i == 0 {
                if !out.is_empty() {
                    out.push(' ');
                }
            } else if element.comma_before {
                out.push_str(", ");
            } else {
                out.push(' ');
            }
            out.push_str(&self.inline(&element.pieces));
        }
        out
    }

    fn query_inline(&self, query: &Query) -> String {
        self.query_clauses(query)
            .iter()
            .map(|c| self.clause_inline(c))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn expr_inline(&self, e: &Expr) -> String {
        let mut p = Pieces::new();
        self.expr(e, &mut p);
        self.inline(&p.0)
    }

    // ---- statements to clauses ----

    fn statement_clauses<'q>(&self, statement: &'q Statement) -> Vec<Clause<'q>> {
        let mut out = Vec::new();
        match statement {
            Statement::Query(q) => out = self.query_clauses(q),
            Statement::Insert(insert) => {
                let mut header = format!("{} {}", self.kw("INSERT INTO"), insert.table);
                if !insert.columns.is_empty() {
                    header.push_str(&format!(" ({})", idents(&insert.columns)));
                }
                out.push(Clause::new(Some(ClauseKind::Insert), header));
                match &insert.source {
                    InsertSource::DefaultValues => {
                        out.push(Clause::new(None, self.kw("DEFAULT VALUES")));
                    }
                    InsertSource::Query(q) => out.extend(self.query_clauses(q)),
                }
                self.returning_clause(&insert.returning, &mut out);
            }
            Statement::Update(update) => {
                let mut header = format!("{} {}", self.kw("UPDATE"), update.table);
                if let Some(alias) = &update.alias {
                    header.push_str(&self.table_alias(alias));
                }
                out.push(Clause::new(Some(ClauseKind::Update), header));
                let assignments = update
                    .assignments
                    .iter()
                    .enumerate()
                    .map(|(i, a)| {
                        let mut p = Pieces::new();
                        p.text(&format!("{} = ", dotted(&a.target)));
                        self.expr(&a.value, &mut p);
                        Element::new(i > 0, p)
                    })
                    .collect();
                out.push(Clause::new(Some(ClauseKind::Set), self.kw("SET")).with_elements(assignments));
                self.from_clause(ClauseKind::From, "FROM", &update.from, &mut out);
                self.predicate_clause(ClauseKind::Where, "WHERE", update.selection.as_ref(), &mut out);
                self.returning_clause(&update.returning, &mut out);
            }
            Statement::Delete(delete) => {
                let mut header = format!("{} {}", self.kw("DELETE FROM"), delete.table);
                if let Some(alias) = &delete.alias {
                    header.push_str(&self.table_alias(alias));
                }
                out.push(Clause::new(Some(ClauseKind::Delete), header));
                self.from_clause(ClauseKind::Using, "USING", &delete.using, &mut out);
                self.predicate_clause(ClauseKind::Where, "WHERE", delete.selection.as_ref(), &mut out);
                self.returning_clause(&delete.returning, &mut out);
            }
            Statement::CreateTable(create) => {
                let mut header = self.kw("CREATE TABLE");
                if create.if_not_exists {
                    header.push_str(&self.kw(" IF NOT EXISTS"));
                }
                header.push_str(&format!(" {} (", create.name));
                let mut elements: Vec<Element<'q>> = Vec::new();
                for column in &create.columns {
                    let comma = !elements.is_empty();
                    elements.push(Element::new(comma, self.column_def(column)));
                }
                for constraint in &create.constraints {
                    let comma = !elements.is_empty();
                    elements.push(Element::new(comma, self.table_constraint(constraint)));
                }
                out.push(Clause {
                    anchor: Some(ClauseKind::Create),
                    keyword: header,
                    elements,
                    force_break: true,
                    close: Some(")"),
                });
            }
            Statement::CreateView(view) => {
                let mut header = self.kw("CREATE");
                if view.or_replace {
                    header.push_str(&self.kw(" OR REPLACE"));
                }
                header.push_str(&format!(" {} {}", self.kw("VIEW"), view.name));
                if !view.columns.is_empty() {
                    header.push_str(&format!(" ({})", idents(&view.columns)));
                }
                header.push_str(&format!(" {}", self.kw("AS")));
                out.push(Clause::new(Some(ClauseKind::Create), header));
                out.extend(self.query_clauses(&view.query));
            }
            Statement::Drop(drop) => {
                let mut text = format!("{} {}", self.kw("DROP"), self.kw(drop.object_type.as_str()));
                if drop.if_exists {
                    text.push_str(&self.kw(" IF EXISTS"));
                }
                let names: Vec<String> = drop.names.iter().map(|n| n.to_string()).collect();
                text.push_str(&format!(" {}", names.join(", ")));
                match drop.behavior {
                    Some(DropBehavior::Cascade) => text.push_str(&self.kw(" CASCADE")),
                    Some(DropBehavior::Restrict) => text.push_str(&self.kw(" RESTRICT")),
                    None => {}
                }
                out.push(Clause::new(Some(ClauseKind::Drop), text));
            }
            Statement::Truncate(truncate) => {
                let mut text = self.kw("TRUNCATE");
                if truncate.table_keyword {
                    text.push_str(&self.kw(" TABLE"));
                }
                let names: Vec<String> = truncate.names.iter().map(|n| n.to_string()).collect();
                text.push_str(&format!(" {}", names.join(", ")));
                out.push(Clause::new(Some(ClauseKind::Truncate), text));
            }
        }
        out
    }

    fn query_clauses<'q>(&self, query: &'q Query) -> Vec<Clause<'q>> {
        let mut out = Vec::new();
        if let Some(with) = &query.with {
            let keyword = if with.recursive {
                self.kw("WITH RECURSIVE")
            } else {
                self.kw("WITH")
            };
            let elements = with
                .ctes
                .iter()
                .enumerate()
                .map(|(i, cte)| {
                    let mut p = Pieces::new();
                    p.text(&cte.name.to_string());
                    if !cte.columns.is_empty() {
                        p.text(&format!(" ({})", idents(&cte.columns)));
                    }
                    p.text(&format!(" {} ", self.kw("AS")));
                    p.block(&cte.query);
                    Element::new(i > 0, p)
                })
                .collect();
            out.push(Clause {
                anchor: Some(ClauseKind::With),
                keyword,
                elements,
                force_break: true,
                close: None,
            });
        }

        self.set_expr_clauses(&query.body, &mut out);

        if !query.order_by.is_empty() {
            let items = query
                .order_by
                .iter()
                .enumerate()
                .map(|(i, item)| Element::new(i > 0, self.order_by_item(item)))
                .collect();
            out.push(Clause::new(Some(ClauseKind::OrderBy), self.kw("ORDER BY")).with_elements(items));
        }
        if let Some(limit) = &query.limit {
            out.push(Clause::new(Some(ClauseKind::Limit), self.row_limit(limit)));
        }
        out
    }

    fn set_expr_clauses<'q>(&self, body: &'q SetExpr, out: &mut Vec<Clause<'q>>) {
        match body {
            SetExpr::Select(select) => self.select_clauses(select, out),
            SetExpr::Query(q) => {
                let mut p = Pieces::new();
                p.sub(q);
                out.push(Clause::new(None, String::new()).with_elements(vec![Element::new(false, p)]));
            }
            SetExpr::SetOperation(op) => {
                self.set_expr_clauses(&op.left, out);
                let mut keyword = self.kw(op.op.as_str());
                match op.quantifier {
                    SetQuantifier::All => keyword.push_str(&self.kw(" ALL")),
                    SetQuantifier::Distinct => keyword.push_str(&self.kw(" DISTINCT")),
                    SetQuantifier::None => {}
                }
                out.push(Clause::new(Some(ClauseKind::SetOperator), keyword));
                self.set_expr_clauses(&op.right, out);
            }
            SetExpr::Values(values) => {
                let rows = values
                    .rows
                    .iter()
                    .enumerate()
                    .map(|(i, row)| {
                        let mut p = Pieces::new();
                        p.text("(");
                        self.expr_list(row, &mut p);
                        p.text(")");
                        Element::new(i > 0, p)
                    })
                    .collect();
                out.push(Clause::new(Some(ClauseKind::Values), self.kw("VALUES")).with_elements(rows));
            }
        }
    }

    fn select_clauses<'q>(&self, select: &'q Select, out: &mut Vec<Clause<'q>>) {
        let mut keyword = self.kw("SELECT");
        match &select.distinct {
            Some(Distinct::All) => keyword.push_str(&self.kw(" ALL")),
            Some(Distinct::Distinct) => keyword.push_str(&self.kw(" DISTINCT")),
            Some(Distinct::On(exprs)) => {
                let list: Vec<String> = exprs.iter().map(|e| self.expr_inline(e)).collect();
                keyword.push_str(&format!(" {} ({})", self.kw("DISTINCT ON"), list.join(", ")));
            }
            None => {}
        }
        if let Some(top) = &select.top {
            let quantity = self.expr_inline(&top.quantity);
            if top.parenthesized {
                keyword.push_str(&format!(" {} ({})", self.kw("TOP"), quantity));
            } else {
                keyword.push_str(&format!(" {} {}", self.kw("TOP"), quantity));
            }
            if top.percent {
                keyword.push_str(&self.kw(" PERCENT"));
            }
        }
        let items = select
            .projection
            .iter()
            .enumerate()
            .map(|(i, item)| Element::new(i > 0, self.select_item(item)))
            .collect();
        out.push(Clause::new(Some(ClauseKind::Select), keyword).with_elements(items));

        self.from_clause(ClauseKind::From, "FROM", &select.from, out);
        self.predicate_clause(ClauseKind::Where, "WHERE", select.selection.as_ref(), out);
        if !select.group_by.is_empty() {
            let items = select
                .group_by
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let mut p = Pieces::new();
                    match item {
                        GroupByItem::Expr(e) => self.expr(e, &mut p),
                        GroupByItem::Rollup(exprs) | GroupByItem::Cube(exprs) => {
                            let word = if matches!(item, GroupByItem::Rollup(_)) {
                                "ROLLUP"
                            } else {
                                "CUBE"
                            };
                            p.text(&format!("{}(", self.kw(word)));
                            self.expr_list(exprs, &mut p);
                            p.text(")");
                        }
                    }
                    Element::new(i > 0, p)
                })
                .collect();
            out.push(Clause::new(Some(ClauseKind::GroupBy), self.kw("GROUP BY")).with_elements(items));
        }
        self.predicate_clause(ClauseKind::Having, "HAVING", select.having.as_ref(), out);
    }

    fn from_clause<'q>(
        &self,
        kind: ClauseKind,
        keyword: &str,
        from: &'q [TableWithJoins],
        out: &mut Vec<Clause<'q>>,
    ) {
        if from.is_empty() {
            return;
        }
        let mut elements = Vec::new();
        for (i, item) in from.iter().enumerate() {
            elements.push(Element::new(i > 0, self.table_factor(&item.relation)));
            for join in &item.joins {
                elements.push(Element::new(false, self.join(join)));
            }
        }
        out.push(Clause::new(Some(kind), self.kw(keyword)).with_elements(elements));
    }

    /// WHERE/HAVING: the top-level AND/OR chain becomes one element per operand.
    fn predicate_clause<'q>(
        &self,
        kind: ClauseKind,
        keyword: &str,
        predicate: Option<&'q Expr>,
        out: &mut Vec<Clause<'q>>,
    ) {
        let Some(predicate) = predicate else {
            return;
        };
        let elements = match predicate {
            Expr::Binary { op, .. } if op.is_keyword() => {
                let mut operands = Vec::new();
                flatten(predicate, *op, &mut operands);
                operands
                    .into_iter()
                    .enumerate()
                    .map(|(i, operand)| {
                        let mut p = Pieces::new();
                        if i == 0 {
                            self.child(operand, operand.precedence() < op.precedence(), &mut p);
                        } else {
                            p.text(&format!("{} ", self.kw(op.as_str())));
                            self.child(operand, right_needs_parens(operand, op.precedence()), &mut p);
                        }
                        Element::new(false, p)
                    })
                    .collect()
            }
            _ => {
                let mut p = Pieces::new();
                self.expr(predicate, &mut p);
                vec![Element::new(false, p)]
            }
        };
        out.push(Clause::new(Some(kind), self.kw(keyword)).with_elements(elements));
    }

    fn returning_clause<'q>(&self, items: &'q [SelectItem], out: &mut Vec<Clause<'q>>) {
        if items.is_empty() {
            return;
        }
        let elements = items
            .iter()
            .enumerate()
            .map(|(i, item)| Element::new(i > 0, self.select_item(item)))
            .collect();
        out.push(Clause::new(Some(ClauseKind::Returning), self.kw("RETURNING")).with_elements(elements));
    }

    fn row_limit(&self, limit: &RowLimit) -> String {
        let mut parts = Vec::new();
        match limit.style {
            LimitStyle::LimitOffset => {
                match &limit.limit {
                    Some(n) => parts.push(format!("{} {}", self.kw("LIMIT"), self.expr_inline(n))),
                    None if limit.offset.is_none() => parts.push(self.kw("LIMIT ALL")),
                    None => {}
                }
                if let Some(offset) = &limit.offset {
                    parts.push(format!("{} {}", self.kw("OFFSET"), self.expr_inline(offset)));
                }
            }
            LimitStyle::FetchFirst => {
                if let Some(offset) = &limit.offset {
                    parts.push(format!(
                        "{} {} {}",
                        self.kw("OFFSET"),
                        self.expr_inline(offset),
                        self.kw("ROWS")
                    ));
                }
                if let Some(n) = &limit.limit {
                    parts.push(format!(
                        "{} {} {}",
                        self.kw("FETCH FIRST"),
                        self.expr_inline(n),
                        self.kw("ROWS ONLY")
                    ));
                }
            }
        }
        parts.join(" ")
    }

    // ---- clause pieces ----

    fn select_item<'q>(&self, item: &'q SelectItem) -> Pieces<'q> {
        let mut p = Pieces::new();
        match item {
            SelectItem::Wildcard { qualifier: None } => p.text("*"),
            SelectItem::Wildcard {
                qualifier: Some(name),
            } => p.text(&format!("{}.*", name)),
            SelectItem::Expr {
                expr,
                alias,
                explicit_as,
            } => {
                self.expr(expr, &mut p);
                if let Some(alias) = alias {
                    if *explicit_as {
                        p.text(&format!(" {} {}", self.kw("AS"), alias));
                    } else {
                        p.text(&format!(" {}", alias));
                    }
                }
            }
        }
        p
    }

    fn order_by_item<'q>(&self, item: &'q OrderByItem) -> Pieces<'q> {
        let mut p = Pieces::new();
        self.expr(&item.expr, &mut p);
        p.text(&self.order_suffix(item));
        p
    }

    fn order_suffix(&self, item: &OrderByItem) -> String {
        let mut out = String::new();
        match item.asc {
            Some(true) => out.push_str(&self.kw(" ASC")),
            Some(false) => out.push_str(&self.kw(" DESC")),
            None => {}
        }
        match item.nulls_first {
            Some(true) => out.push_str(&self.kw(" NULLS FIRST")),
            Some(false) => out.push_str(&self.kw(" NULLS LAST")),
            None => {}
        }
        out
    }

    fn table_alias(&self, alias: &TableAlias) -> String {
        let mut out = if alias.explicit_as {
            format!(" {} {}", self.kw("AS"), alias.name)
        } else {
            format!(" {}", alias.name)
        };
        if !alias.columns.is_empty() {
            out.push_str(&format!(" ({})", idents(&alias.columns)));
        }
        out
    }

    fn table_factor<'q>(&self, factor: &'q TableFactor) -> Pieces<'q> {
        let mut p = Pieces::new();
        match factor {
            TableFactor::Table { name, alias, .. } => {
                p.text(&name.to_string());
                if let Some(alias) = alias {
                    p.text(&self.table_alias(alias));
                }
            }
            TableFactor::Derived {
                lateral,
                subquery,
                alias,
                ..
            } => {
                if *lateral {
                    p.text(&self.kw("LATERAL "));
                }
                p.sub(subquery);
                if let Some(alias) = alias {
                    p.text(&self.table_alias(alias));
                }
            }
            TableFactor::Function {
                lateral,
                call,
                alias,
                ..
            } => {
                if *lateral {
                    p.text(&self.kw("LATERAL "));
                }
                self.function(call, &mut p);
                if let Some(alias) = alias {
                    p.text(&self.table_alias(alias));
                }
            }
        }
        p
    }

    fn join<'q>(&self, join: &'q Join) -> Pieces<'q> {
        let mut p = Pieces::new();
        if join.natural {
            p.text(&self.kw("NATURAL "));
        }
        p.text(&format!("{} ", self.kw(join.operator.as_str())));
        let relation = self.table_factor(&join.relation);
        p.append(relation);
        match &join.constraint {
            JoinConstraint::On(e) => {
                p.text(&format!(" {} ", self.kw("ON")));
                self.expr(e, &mut p);
            }
            JoinConstraint::Using(columns) => {
                p.text(&format!(" {} ({})", self.kw("USING"), idents(columns)));
            }
            JoinConstraint::None => {}
        }
        p
    }

    fn column_def<'q>(&self, column: &'q ColumnDef) -> Pieces<'q> {
        let mut p = Pieces::new();
        p.text(&format!("{} {}", column.name, self.data_type(&column.data_type)));
        for def in &column.options {
            if let Some(name) = &def.name {
                p.text(&format!(" {} {}", self.kw("CONSTRAINT"), name));
            }
            match &def.option {
                ColumnOption::Null => p.text(&self.kw(" NULL")),
                ColumnOption::NotNull => p.text(&self.kw(" NOT NULL")),
                ColumnOption::PrimaryKey => p.text(&self.kw(" PRIMARY KEY")),
                ColumnOption::Unique => p.text(&self.kw(" UNIQUE")),
                ColumnOption::Default(e) => {
                    p.text(&self.kw(" DEFAULT "));
                    self.expr(e, &mut p);
                }
                ColumnOption::Check(e) => {
                    p.text(&self.kw(" CHECK ("));
                    self.expr(e, &mut p);
                    p.text(")");
                }
                ColumnOption::References { table, columns } => {
                    p.text(&format!(" {} {}", self.kw("REFERENCES"), table));
                    if !columns.is_empty() {
                        p.text(&format!(" ({})", idents(columns)));
                    }
                }
            }
        }
        p
    }

    fn table_constraint<'q>(&self, constraint: &'q TableConstraint) -> Pieces<'q> {
        let mut p = Pieces::new();
        if let Some(name) = &constraint.name {
            p.text(&format!("{} {} ", self.kw("CONSTRAINT"), name));
        }
        match &constraint.kind {
            TableConstraintKind::PrimaryKey(columns) => {
                p.text(&format!("{} ({})", self.kw("PRIMARY KEY"), idents(columns)));
            }
            TableConstraintKind::Unique(columns) => {
                p.text(&format!("{} ({})", self.kw("UNIQUE"), idents(columns)));
            }
            TableConstraintKind::ForeignKey {
                columns,
                foreign_table,
                referred_columns,
            } => {
                p.text(&format!(
                    "{} ({}) {} {}",
                    self.kw("FOREIGN KEY"),
                    idents(columns),
                    self.kw("REFERENCES"),
                    foreign_table
                ));
                if !referred_columns.is_empty() {
                    p.text(&format!(" ({})", idents(referred_columns)));
                }
            }
            TableConstraintKind::Check(e) => {
                p.text(&self.kw("CHECK ("));
                self.expr(e, &mut p);
                p.text(")");
            }
        }
        p
    }

    fn data_type(&self, data_type: &DataType) -> String {
        let mut out = if data_type.is_builtin() {
            self.kw(&data_type.name)
        } else {
            data_type.name.clone()
        };
        if !data_type.args.is_empty() {
            out.push_str(&format!("({})", data_type.args.join(", ")));
        }
        match data_type.time_zone {
            Some(true) => out.push_str(&self.kw(" WITH TIME ZONE")),
            Some(false) => out.push_str(&self.kw(" WITHOUT TIME ZONE")),
            None => {}
        }
        for _ in 0..data_type.array_dims {
            out.push_str("[]");
        }
        out
    }

    // ---- expressions ----

    fn child<'q>(&self, e: &'q Expr, parens: bool, p: &mut Pieces<'q>) {
        if parens {
            p.text("(");
            self.expr(e, p);
            p.text(")");
        } else {
            self.expr(e, p);
        }
    }

    fn expr_list<'q>(&self, list: &'q [Expr], p: &mut Pieces<'q>) {
        for (i, e) in list.iter().enumerate() {
            if i > 0 {
                p.text(", ");
            }
            self.expr(e, p);
        }
    }

    fn not(&self, negated: bool) -> String {
        if negated {
            self.kw("NOT ")
        } else {
            String::new()
        }
    }

    fn expr<'q>(&self, e: &'q Expr, p: &mut Pieces<'q>) {
        p.append(ExprRenderer::new(self).render(e));
    }

    fn function<'q>(&self, call: &'q FunctionCall, p: &mut Pieces<'q>) {
        p.append(ExprRenderer::new(self).render(call));
    }

    fn literal(&self, literal: &Literal) -> String {
        match literal {
            Literal::Number(n) => n.clone(),
            Literal::String(s) => s.raw.clone(),
            Literal::Boolean(true) => self.kw("TRUE"),
            Literal::Boolean(false) => self.kw("FALSE"),
            Literal::Null => self.kw("NULL"),
        }
    }
}

/// Operands of a left-associated chain of `op`.
fn flatten<'e>(e: &'e Expr, op: BinaryOp, out: &mut Vec<&'e Expr>) {
    match e {
        Expr::Binary {
            left,
            op: inner,
            right,
        } if *inner == op => {
            flatten(left, op, out);
            out.push(right);
        }
        _ => out.push(e),
    }
}
