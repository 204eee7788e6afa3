//! Static book catalog shown to the model on request

/// The bookstore catalog. Plain text; the model does all matching against it.
const CATALOG: &str = "CATALOG:

Fiction:
- The Great Gatsby (F. Scott Fitzgerald)
- To Kill a Mockingbird (Harper Lee)
- 1984 (George Orwell)
- The Midnight Library (Matt Haig)

Non-Fiction:
- Sapiens: A Brief History of Humankind (Yuval Noah Harari)
- Educated (Tara Westover)
- Atomic Habits (James Clear)
- The Psychology of Money (Morgan Housel)

Self-Development:
- Deep Work (Cal Newport)
- The 7 Habits of Highly Effective People (Stephen R. Covey)
- Think and Grow Rich (Napoleon Hill)
- Ikigai: The Japanese Secret to a Long and Happy Life (Héctor García & Francesc Miralles)

Technology & Data:
- Artificial Intelligence: A Guide for Thinking Humans (Melanie Mitchell)
- Hands-On Machine Learning with Scikit-Learn, Keras, and TensorFlow (Aurélien Géron)
- Data Science for Business (Foster Provost & Tom Fawcett)
- Python Crash Course (Eric Matthes)

Children's Books:
- Harry Potter and the Sorcerer's Stone (J.K. Rowling)
- Charlie and the Chocolate Factory (Roald Dahl)
- The Little Prince (Antoine de Saint-Exupéry)
- Diary of a Wimpy Kid (Jeff Kinney)

Notes:
- Some books may be temporarily out of stock.
- Prices vary depending on edition (paperback, hardcover, or e-book).
- Special requests: Gift wrapping available upon request.
";

pub fn get_catalog() -> &'static str {
    CATALOG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lists_every_category() {
        let catalog = get_catalog();
        for category in [
            "Fiction:",
            "Non-Fiction:",
            "Self-Development:",
            "Technology & Data:",
            "Children's Books:",
        ] {
            assert!(catalog.contains(category), "missing {category}");
        }
        assert!(catalog.contains("1984 (George Orwell)"));
    }
}
