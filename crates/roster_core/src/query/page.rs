//! Sorting and pagination types for member queries.

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Member columns that can drive ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberProperty {
    Id,
    Username,
    Age,
}

impl MemberProperty {
    fn column(self) -> &'static str {
        match self {
            Self::Id => "m.member_id",
            Self::Username => "m.username",
            Self::Age => "m.age",
        }
    }
}

/// One ordering term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub property: MemberProperty,
    pub direction: Direction,
}

/// Ordered list of sort terms, applied before any page window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub orders: Vec<Order>,
}

impl Sort {
    /// No explicit ordering; rows come back in insertion order.
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn by(direction: Direction, property: MemberProperty) -> Self {
        Self::unsorted().then(direction, property)
    }

    /// Appends a lower-priority sort term.
    pub fn then(mut self, direction: Direction, property: MemberProperty) -> Self {
        self.orders.push(Order {
            property,
            direction,
        });
        self
    }

    pub fn is_unsorted(&self) -> bool {
        self.orders.is_empty()
    }

    /// Renders the `ORDER BY` clause, always ending with the id tie-breaker.
    pub(crate) fn to_order_by(&self) -> String {
        let mut terms = self
            .orders
            .iter()
            .map(|order| format!("{} {}", order.property.column(), order.direction.as_sql()))
            .collect::<Vec<_>>();

        if !self
            .orders
            .iter()
            .any(|order| order.property == MemberProperty::Id)
        {
            terms.push("m.member_id ASC".to_string());
        }

        format!(" ORDER BY {}", terms.join(", "))
    }
}

/// Requested page window: zero-based page index, page size and ordering.
///
/// Deserialization goes through [`PageRequest::sorted`], so a zero size is
/// rejected there as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PageRequestFields")]
pub struct PageRequest {
    page: u32,
    size: u32,
    sort: Sort,
}

/// Rejected page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPageRequest {
    pub page: u32,
    pub size: u32,
}

impl std::fmt::Display for InvalidPageRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid page request page={} size={}; size must be at least 1",
            self.page, self.size
        )
    }
}

impl std::error::Error for InvalidPageRequest {}

#[derive(Deserialize)]
struct PageRequestFields {
    page: u32,
    size: u32,
    #[serde(default)]
    sort: Sort,
}

impl TryFrom<PageRequestFields> for PageRequest {
    type Error = InvalidPageRequest;

    fn try_from(fields: PageRequestFields) -> Result<Self, Self::Error> {
        Self::sorted(fields.page, fields.size, fields.sort)
    }
}

impl PageRequest {
    /// Creates an unsorted page request.
    ///
    /// # Errors
    /// - `InvalidPageRequest` when `size` is 0.
    pub fn of(page: u32, size: u32) -> Result<Self, InvalidPageRequest> {
        Self::sorted(page, size, Sort::unsorted())
    }

    pub fn sorted(page: u32, size: u32, sort: Sort) -> Result<Self, InvalidPageRequest> {
        if size == 0 {
            return Err(InvalidPageRequest { page, size });
        }
        Ok(Self { page, size, sort })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    /// Number of rows skipped before this window starts.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// Request for the following page with the same size and ordering.
    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            size: self.size,
            sort: self.sort.clone(),
        }
    }
}

/// One window of query results plus totals for the whole predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    /// Zero-based page index.
    pub number: u32,
    pub size: u32,
    /// Rows matching the predicate across all pages.
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            number: request.page(),
            size: request.size(),
            total_elements,
        }
    }

    /// `ceil(total_elements / size)`; 0 when nothing matched.
    pub fn total_pages(&self) -> u64 {
        match self.size {
            0 => 0,
            size => self.total_elements.div_ceil(u64::from(size)),
        }
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn is_first(&self) -> bool {
        self.number == 0
    }

    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.number) + 1 < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }

    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    /// Converts the content while keeping page metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Direction, MemberProperty, Page, PageRequest, Sort};

    #[test]
    fn zero_size_is_rejected() {
        let err = PageRequest::of(0, 0).unwrap_err();
        assert_eq!(err.size, 0);
    }

    #[test]
    fn deserialized_request_is_validated() {
        let err = serde_json::from_str::<PageRequest>(
            r#"{"page":0,"size":0,"sort":{"orders":[]}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("size must be at least 1"));

        let request: PageRequest = serde_json::from_str(r#"{"page":2,"size":4}"#).unwrap();
        assert_eq!(request, PageRequest::of(2, 4).unwrap());
        assert_eq!(request.offset(), 8);
    }

    #[test]
    fn totals_follow_ceiling_division() {
        let request = PageRequest::of(0, 3).unwrap();
        let page = Page::new(vec![1, 2, 3], &request, 10);
        assert_eq!(page.total_pages(), 4);
        assert!(page.is_first());
        assert!(page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn last_page_has_no_next() {
        let request = PageRequest::of(3, 3).unwrap();
        let page = Page::new(vec![10], &request, 10);
        assert!(page.is_last());
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let request = PageRequest::of(0, 5).unwrap();
        let page: Page<i32> = Page::new(Vec::new(), &request, 0);
        assert_eq!(page.total_pages(), 0);
        assert!(page.is_first());
        assert!(!page.has_next());
    }

    #[test]
    fn order_by_always_ends_with_id_tiebreaker() {
        let sort = Sort::by(Direction::Desc, MemberProperty::Username)
            .then(Direction::Asc, MemberProperty::Age);
        assert_eq!(
            sort.to_order_by(),
            " ORDER BY m.username DESC, m.age ASC, m.member_id ASC"
        );
        assert_eq!(
            Sort::by(Direction::Desc, MemberProperty::Id).to_order_by(),
            " ORDER BY m.member_id DESC"
        );
    }

    #[test]
    fn offset_multiplies_page_and_size() {
        let request = PageRequest::of(2, 25).unwrap();
        assert_eq!(request.offset(), 50);
        assert_eq!(request.next().page(), 3);
    }

    #[test]
    fn map_keeps_metadata() {
        let request = PageRequest::of(1, 2).unwrap();
        let page = Page::new(vec![1, 2], &request, 5).map(|value| value * 10);
        assert_eq!(page.content, vec![10, 20]);
        assert_eq!(page.number, 1);
        assert_eq!(page.total_pages(), 3);
    }
}
