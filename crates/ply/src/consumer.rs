use crate::header::ScalarType;

/// How a consumer wants a declared element handled.
pub enum ElementBinding<E> {
    /// Route the element's records through the consumer with this token.
    Handle(E),
    /// Discard the element's records without invoking the consumer.
    Skip,
}

/// Receives the typed event stream of one parsing pass.
///
/// Element and property names are resolved exactly once, at declaration
/// time, into the consumer's binding tokens. The per-record callbacks then
/// dispatch on those tokens, so no string comparison happens while the data
/// section streams through.
///
/// Returning `Err` from a `bind_*` call rejects a declaration the consumer
/// cannot interpret; returning `Err` from any per-record callback aborts the
/// pass. Both surface as [`ParseError::Consumer`](crate::ParseError).
pub trait Consumer {
    type Element: Copy;
    type Scalar: Copy;
    type List: Copy;
    type Error: std::error::Error + 'static;

    /// Called once per `element` declaration, in header order. `count` is
    /// the declared number of records.
    fn bind_element(&mut self, name: &str, count: usize) -> ElementBinding<Self::Element>;

    /// Called once per scalar property declared under a handled element.
    fn bind_scalar(
        &mut self,
        element: Self::Element,
        property: &str,
        ty: ScalarType,
    ) -> Result<Self::Scalar, Self::Error>;

    /// Called once per list property declared under a handled element.
    fn bind_list(
        &mut self,
        element: Self::Element,
        property: &str,
        size: ScalarType,
        item: ScalarType,
    ) -> Result<Self::List, Self::Error>;

    /// Brackets one record of a handled element. Property callbacks for the
    /// record's fields arrive between the two, in declared order.
    fn begin_element(&mut self, element: Self::Element) -> Result<(), Self::Error>;
    fn end_element(&mut self, element: Self::Element) -> Result<(), Self::Error>;

    fn scalar(&mut self, binding: Self::Scalar, value: f32) -> Result<(), Self::Error>;

    /// Brackets one list value. `len` is the size prefix; one `list_item`
    /// call follows per item.
    fn begin_list(&mut self, binding: Self::List, len: usize) -> Result<(), Self::Error>;
    fn list_item(&mut self, binding: Self::List, value: i32) -> Result<(), Self::Error>;
    fn end_list(&mut self, binding: Self::List) -> Result<(), Self::Error>;

    /// Non-fatal diagnostics carrying the source name and 1-based line
    /// number. The parser decides what is fatal; these only inform.
    fn info(&mut self, source: &str, line: usize, message: &str);
    fn warning(&mut self, source: &str, line: usize, message: &str);
    fn error(&mut self, source: &str, line: usize, message: &str);
}
