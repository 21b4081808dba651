//! Static reference dataset: the course catalog.
//!
//! Learning paths, modules, topics, and practice problems are fixed at
//! process start and never mutate. They are stored flat; the relational
//! nesting callers see on `learning_paths` reads (path → modules → topics)
//! is synthesized freshly on every read by filtering the base arrays on
//! foreign keys, never cached pre-nested. That keeps a single source of
//! truth and makes staleness impossible by construction.
use crate::types::Row;
use serde_json::json;
use std::sync::LazyLock;

static LEARNING_PATHS: LazyLock<Vec<Row>> = LazyLock::new(|| {
    vec![
        json!({
            "id": "704f3e29-1784-4b3c-90ab-9c19394b1b02",
            "title": "Data Structures & Algorithms",
            "description": "Master DSA through pattern recognition. Learn the fundamental patterns that solve 90% of coding problems.",
            "icon": "code",
            "estimated_hours": 120,
            "display_order": 1,
        }),
        json!({
            "id": "f3e055aa-f693-4d2b-a52b-80db4ee29bb6",
            "title": "System Design",
            "description": "From basics to advanced distributed systems. Learn to design scalable, reliable systems.",
            "icon": "network",
            "estimated_hours": 80,
            "display_order": 2,
        }),
        json!({
            "id": "e39e41c4-5248-4f13-b9d4-f2315e4a834f",
            "title": "Low Level Design",
            "description": "Object-oriented design patterns and SOLID principles. Design clean, maintainable code.",
            "icon": "box",
            "estimated_hours": 60,
            "display_order": 3,
        }),
        json!({
            "id": "74891abb-0ebb-464b-885a-be1dacc2751d",
            "title": "Operating Systems",
            "description": "Understand how operating systems work. Processes, threads, memory management, and more.",
            "icon": "cpu",
            "estimated_hours": 70,
            "display_order": 4,
        }),
        json!({
            "id": "29fd0583-d2a2-4bf7-9dd5-85f63fbd71cb",
            "title": "Computer Networks",
            "description": "Learn networking fundamentals, protocols, and how the internet works.",
            "icon": "wifi",
            "estimated_hours": 50,
            "display_order": 5,
        }),
        json!({
            "id": "ebae0cb3-070c-4837-aa84-32003ea4390e",
            "title": "Database Management",
            "description": "Relational databases, SQL, transactions, indexing, and optimization.",
            "icon": "database",
            "estimated_hours": 60,
            "display_order": 6,
        }),
        json!({
            "id": "d7c14297-a3c5-4f46-9dd3-9a6186527fa2",
            "title": "AI & Machine Learning",
            "description": "Practical introduction to ML algorithms, neural networks, and real-world applications.",
            "icon": "brain",
            "estimated_hours": 100,
            "display_order": 7,
        }),
    ]
});

static MODULES: LazyLock<Vec<Row>> = LazyLock::new(|| {
    vec![
        json!({"id": "m1", "learning_path_id": "704f3e29-1784-4b3c-90ab-9c19394b1b02", "title": "Arrays & Hashing", "display_order": 1}),
        json!({"id": "m2", "learning_path_id": "704f3e29-1784-4b3c-90ab-9c19394b1b02", "title": "Two Pointers & Sliding Window", "display_order": 2}),
        json!({"id": "m3", "learning_path_id": "704f3e29-1784-4b3c-90ab-9c19394b1b02", "title": "Trees & Graphs", "display_order": 3}),
        json!({"id": "m4", "learning_path_id": "704f3e29-1784-4b3c-90ab-9c19394b1b02", "title": "Dynamic Programming", "display_order": 4}),
        json!({"id": "m5", "learning_path_id": "f3e055aa-f693-4d2b-a52b-80db4ee29bb6", "title": "System Design Fundamentals", "display_order": 1}),
        json!({"id": "m6", "learning_path_id": "f3e055aa-f693-4d2b-a52b-80db4ee29bb6", "title": "Scalability Patterns", "display_order": 2}),
        json!({"id": "m7", "learning_path_id": "e39e41c4-5248-4f13-b9d4-f2315e4a834f", "title": "SOLID Principles", "display_order": 1}),
        json!({"id": "m8", "learning_path_id": "e39e41c4-5248-4f13-b9d4-f2315e4a834f", "title": "Design Patterns", "display_order": 2}),
        json!({"id": "m9", "learning_path_id": "74891abb-0ebb-464b-885a-be1dacc2751d", "title": "Process Management", "display_order": 1}),
        json!({"id": "m10", "learning_path_id": "29fd0583-d2a2-4bf7-9dd5-85f63fbd71cb", "title": "Network Layers", "display_order": 1}),
        json!({"id": "m11", "learning_path_id": "ebae0cb3-070c-4837-aa84-32003ea4390e", "title": "SQL Fundamentals", "display_order": 1}),
        json!({"id": "m12", "learning_path_id": "d7c14297-a3c5-4f46-9dd3-9a6186527fa2", "title": "ML Basics", "display_order": 1}),
    ]
});

static TOPICS: LazyLock<Vec<Row>> = LazyLock::new(|| {
    vec![
        json!({
            "id": "t1", "module_id": "m1", "title": "Hash Tables", "display_order": 1, "estimated_minutes": 30,
            "concept": "A hash table maps keys to values using a hash function that converts the key into an array index. Insert, search, and delete are O(1) on average with O(n) space.",
            "thought_process": "Finding duplicates, counting frequencies, pairs with a target sum, grouping anagrams: think hash table first. O(1) lookup often turns an O(n^2) brute force into O(n).",
            "common_mistakes": "Not handling collisions, using mutable objects as keys, forgetting the extra space cost.",
        }),
        json!({
            "id": "t2", "module_id": "m1", "title": "Array Manipulation", "display_order": 2, "estimated_minutes": 25,
            "concept": "Arrays are contiguous memory blocks storing same-type elements. Key patterns: in-place modification, prefix sums, Kadane's algorithm for max subarray.",
            "thought_process": "Ask: can I sort and gain something? Can prefix sums help? Is there a pattern in indices? Can two pointers reduce complexity?",
            "common_mistakes": "Off-by-one errors, modifying the array while iterating, missing the empty-array edge case, overflow in sums.",
        }),
        json!({
            "id": "t3", "module_id": "m2", "title": "Two Pointers Technique", "display_order": 1, "estimated_minutes": 35,
            "concept": "Two pointers iterate through the structure in tandem until a termination condition. Variations: same direction (fast/slow), opposite directions, different arrays.",
            "thought_process": "Use when the array is sorted or sortable, when looking for pairs with a property, or when detecting cycles with fast/slow pointers.",
            "common_mistakes": "Infinite loops from wrong pointer movement, unhandled duplicates, not verifying sortedness first.",
        }),
        json!({
            "id": "t4", "module_id": "m2", "title": "Sliding Window", "display_order": 2, "estimated_minutes": 40,
            "concept": "A window slides through the array maintaining a subset of data; used for contiguous-sequence problems. Fixed-size and variable-size variants.",
            "thought_process": "Reach for it on 'contiguous subarray/substring', 'max/min of all subarrays of size k', 'longest substring with property X'.",
            "common_mistakes": "Stale window state when shrinking, off-by-one in window size, forgetting to reset state.",
        }),
        json!({
            "id": "t5", "module_id": "m3", "title": "Binary Trees", "display_order": 1, "estimated_minutes": 45,
            "concept": "Hierarchical structure where each node has at most two children. Traversals: inorder, preorder, postorder. Height is the longest root-to-leaf path.",
            "thought_process": "Which traversal order makes sense? Can recursion with return values do it? Is it a BST whose ordering property helps?",
            "common_mistakes": "Null nodes unhandled, height confused with depth, missing recursion base cases.",
        }),
        json!({
            "id": "t6", "module_id": "m3", "title": "Graph Traversals", "display_order": 2, "estimated_minutes": 50,
            "concept": "BFS explores level by level with a queue; DFS goes deep with recursion or a stack. BFS finds shortest paths in unweighted graphs; DFS detects cycles and orders topologically.",
            "thought_process": "BFS for shortest path and level-order processing; DFS for exploring all paths, cycle detection, and topological sort.",
            "common_mistakes": "Unmarked visited nodes, queue/stack mixups, disconnected components skipped.",
        }),
        json!({
            "id": "t7", "module_id": "m4", "title": "DP Fundamentals", "display_order": 1, "estimated_minutes": 60,
            "concept": "Break problems into overlapping subproblems and store their solutions. Top-down memoization or bottom-up tabulation.",
            "thought_process": "Identify overlapping subproblems, write the recurrence, pin down base cases and state, then consider space optimization.",
            "common_mistakes": "Wrong base cases, incorrect state transitions, table index out of bounds.",
        }),
        json!({
            "id": "t8", "module_id": "m5", "title": "Scalability Basics", "display_order": 1, "estimated_minutes": 45,
            "concept": "Scalability is handling growing load: horizontal scaling adds machines, vertical adds power. Key metrics: throughput, latency, availability.",
            "thought_process": "Identify bottlenecks, weigh read vs write patterns, plan data partitioning, design for failure.",
            "common_mistakes": "Premature optimization, ignored network latency, single points of failure.",
        }),
        json!({
            "id": "t9", "module_id": "m6", "title": "Load Balancing", "display_order": 1, "estimated_minutes": 35,
            "concept": "Load balancers spread traffic across servers: round robin, least connections, IP hash, weighted. L4 vs L7 balancing.",
            "thought_process": "Consider statefulness, health checks and failover, SSL termination, geographic distribution.",
            "common_mistakes": "Session affinity issues, uneven distribution, the balancer itself becoming the bottleneck.",
        }),
        json!({
            "id": "t10", "module_id": "m7", "title": "Single Responsibility", "display_order": 1, "estimated_minutes": 25,
            "concept": "A class should have only one reason to change; each module does one thing well. Pays off in testing, maintainability, and coupling.",
            "thought_process": "Can you describe the class in one sentence without 'and'? Who might request changes to it, and for how many reasons?",
            "common_mistakes": "God classes, over-separation into tiny fragments, confusing responsibility with functionality.",
        }),
    ]
});

static PRACTICE_PROBLEMS: LazyLock<Vec<Row>> = LazyLock::new(|| {
    vec![
        json!({
            "id": "p1", "topic_id": "t1", "title": "Two Sum", "difficulty": "easy",
            "pattern_tags": ["Hash Table", "Array"],
            "hints": ["Use a hash map to store complements", "One pass is enough"],
            "optimal_solution": "def twoSum(nums, target):\n    seen = {}\n    for i, num in enumerate(nums):\n        if target - num in seen:\n            return [seen[target - num], i]\n        seen[num] = i",
            "description": "Given an array of integers nums and an integer target, return indices of the two numbers such that they add up to target.",
        }),
        json!({
            "id": "p2", "topic_id": "t1", "title": "Contains Duplicate", "difficulty": "easy",
            "pattern_tags": ["Hash Table", "Array"],
            "hints": ["A set can help detect duplicates", "Compare set size with array length"],
            "optimal_solution": "def containsDuplicate(nums):\n    return len(nums) != len(set(nums))",
            "description": "Given an integer array nums, return true if any value appears at least twice in the array.",
        }),
        json!({
            "id": "p3", "topic_id": "t2", "title": "Maximum Subarray", "difficulty": "medium",
            "pattern_tags": ["Array", "Dynamic Programming", "Kadane"],
            "hints": ["Track current sum and max sum", "Reset current sum when it goes negative"],
            "optimal_solution": "def maxSubArray(nums):\n    max_sum = current = nums[0]\n    for num in nums[1:]:\n        current = max(num, current + num)\n        max_sum = max(max_sum, current)\n    return max_sum",
            "description": "Find the contiguous subarray which has the largest sum and return its sum.",
        }),
        json!({
            "id": "p4", "topic_id": "t3", "title": "Valid Palindrome", "difficulty": "easy",
            "pattern_tags": ["Two Pointers", "String"],
            "hints": ["Use two pointers from both ends", "Skip non-alphanumeric characters"],
            "optimal_solution": "def isPalindrome(s):\n    left, right = 0, len(s) - 1\n    while left < right:\n        if s[left].lower() != s[right].lower():\n            return False\n        left, right = left + 1, right - 1\n    return True",
            "description": "Given a string s, return true if it is a palindrome considering only alphanumeric characters.",
        }),
        json!({
            "id": "p5", "topic_id": "t3", "title": "3Sum", "difficulty": "medium",
            "pattern_tags": ["Two Pointers", "Array", "Sorting"],
            "hints": ["Sort the array first", "Fix one element and use two pointers for the rest", "Skip duplicates"],
            "optimal_solution": "def threeSum(nums):\n    nums.sort()\n    # fix one element, two-pointer the remainder, skipping duplicates",
            "description": "Find all unique triplets in the array which gives the sum of zero.",
        }),
        json!({
            "id": "p6", "topic_id": "t4", "title": "Longest Substring Without Repeating", "difficulty": "medium",
            "pattern_tags": ["Sliding Window", "Hash Table", "String"],
            "hints": ["Use a set to track characters in current window", "Shrink window when duplicate found"],
            "optimal_solution": "def lengthOfLongestSubstring(s):\n    chars, left, best = set(), 0, 0\n    for right, c in enumerate(s):\n        while c in chars:\n            chars.remove(s[left]); left += 1\n        chars.add(c)\n        best = max(best, right - left + 1)\n    return best",
            "description": "Find the length of the longest substring without repeating characters.",
        }),
        json!({
            "id": "p7", "topic_id": "t5", "title": "Invert Binary Tree", "difficulty": "easy",
            "pattern_tags": ["Tree", "Recursion", "BFS"],
            "hints": ["Swap left and right children", "Recursively invert subtrees"],
            "optimal_solution": "def invertTree(root):\n    if not root:\n        return None\n    root.left, root.right = invertTree(root.right), invertTree(root.left)\n    return root",
            "description": "Invert a binary tree (mirror it).",
        }),
        json!({
            "id": "p8", "topic_id": "t5", "title": "Maximum Depth of Binary Tree", "difficulty": "easy",
            "pattern_tags": ["Tree", "Recursion", "DFS"],
            "hints": ["Base case: null node has depth 0", "Max depth is 1 + max of children depths"],
            "optimal_solution": "def maxDepth(root):\n    if not root:\n        return 0\n    return 1 + max(maxDepth(root.left), maxDepth(root.right))",
            "description": "Find the maximum depth of a binary tree.",
        }),
        json!({
            "id": "p9", "topic_id": "t6", "title": "Number of Islands", "difficulty": "medium",
            "pattern_tags": ["Graph", "DFS", "BFS", "Matrix"],
            "hints": ["Treat grid as a graph", "DFS/BFS from each unvisited land cell", "Mark visited cells"],
            "optimal_solution": "def numIslands(grid):\n    # flood-fill from each unvisited land cell, counting fills",
            "description": "Given a 2D grid map of 1s (land) and 0s (water), count the number of islands.",
        }),
        json!({
            "id": "p10", "topic_id": "t7", "title": "Climbing Stairs", "difficulty": "easy",
            "pattern_tags": ["Dynamic Programming", "Fibonacci"],
            "hints": ["Ways to reach step n = ways to reach n-1 + ways to reach n-2", "Base cases: 1 way to reach step 1, 2 ways to reach step 2"],
            "optimal_solution": "def climbStairs(n):\n    if n <= 2:\n        return n\n    prev, curr = 1, 2\n    for _ in range(3, n + 1):\n        prev, curr = curr, prev + curr\n    return curr",
            "description": "You can climb 1 or 2 steps at a time. In how many distinct ways can you climb to the top?",
        }),
    ]
});

/// The flat learning-path rows (no nesting).
pub fn learning_paths() -> &'static [Row] {
    &LEARNING_PATHS
}

/// The flat module rows.
pub fn modules() -> &'static [Row] {
    &MODULES
}

/// The flat topic rows.
pub fn topics() -> &'static [Row] {
    &TOPICS
}

/// The practice-problem rows.
pub fn practice_problems() -> &'static [Row] {
    &PRACTICE_PROBLEMS
}

/// Compute the nested learning-path projection.
///
/// Each path row is augmented with its `modules` (by `learning_path_id`),
/// each module with its `topics` (by `module_id`). Built from the immutable
/// base arrays on every call.
pub fn learning_paths_nested() -> Vec<Row> {
    LEARNING_PATHS
        .iter()
        .map(|path| {
            let mut path = path.clone();
            let path_id = path["id"].clone();

            let nested_modules: Vec<Row> = MODULES
                .iter()
                .filter(|m| m["learning_path_id"] == path_id)
                .map(|m| {
                    let mut m = m.clone();
                    let module_id = m["id"].clone();
                    let nested_topics: Vec<Row> = TOPICS
                        .iter()
                        .filter(|t| t["module_id"] == module_id)
                        .cloned()
                        .collect();
                    m["topics"] = Row::from(nested_topics);
                    m
                })
                .collect();

            path["modules"] = Row::from(nested_modules);
            path
        })
        .collect()
}

/// Resolve the readable snapshot for a static table name, if it is one.
pub fn static_rows(table: &str) -> Option<Vec<Row>> {
    match table {
        "learning_paths" => Some(learning_paths_nested()),
        "modules" => Some(MODULES.clone()),
        "topics" => Some(TOPICS.clone()),
        "practice_problems" => Some(PRACTICE_PROBLEMS.clone()),
        _ => None,
    }
}
